//! Command-line surface.
use std::path::PathBuf;

use clap::Parser;

use crate::interval::Interval;

/// Creates and rotates read-only snapshots of btrfs subvolumes.
///
/// Intended to be driven by cron: each crontab entry invokes the tool with
/// one interval name, and the config file decides which subvolumes get a
/// snapshot and how many of each interval to retain.
#[derive(Parser, Debug)]
#[command(name = "btrfs-snappy", version)]
pub struct Cli {
    /// Interval prefix used to name all snapshots and for tracking the
    /// number of snapshots to keep
    #[arg(value_enum)]
    pub interval: Option<Interval>,

    /// Create a new default config file at the location given by `--config`
    #[arg(long = "create_config")]
    pub create_config: bool,

    /// Location of the yaml config file
    #[arg(short = 'c', long, default_value = "/etc/btrfs-snappy.conf")]
    pub config: PathBuf,

    /// Where to place the snapshots, relative to the subvolume root
    #[arg(short = 'd', long, default_value = ".snapshots")]
    pub destination: PathBuf,

    /// Don't print status messages to stdout
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
