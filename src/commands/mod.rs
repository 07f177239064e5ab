//! Top-level command orchestration.
pub mod run;
pub mod write_config;
