//! Scheduled creation and retention-based rotation of btrfs snapshots.
//!
//! Driven by cron: each invocation names one interval (`minute`, `hourly`,
//! `daily`, `weekly`, `monthly`, `yearly`), takes one new read-only snapshot
//! per configured subvolume, and purges the oldest snapshots beyond that
//! interval's retention count.
//!
//! The crate is organised around the rotation core and its ports:
//!
//! - **[`config`]** — parse and validate the YAML retention/location schema
//! - **[`inventory`]** — enumerate existing snapshots in chronological order
//! - **[`rotation`]** — decide what to create and what to purge
//! - **[`backend`]** / **[`clock`]** — injectable ports to the snapshot tool
//!   and the timestamp source
//! - **[`commands`]** — top-level orchestration for the CLI entry point

pub mod backend;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod interval;
pub mod inventory;
pub mod logging;
pub mod rotation;
