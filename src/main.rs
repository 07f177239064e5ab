use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use btrfs_snappy::cli::Cli;
use btrfs_snappy::commands;
use btrfs_snappy::logging::{self, Logger};

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let _log_path = logging::init_file_sink();
    let log = Logger::new(args.quiet);

    if args.create_config {
        commands::write_config::run(&args.config, &log)?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(interval) = args.interval else {
        // No action requested: show usage and exit non-zero so crontab
        // misconfigurations surface instead of silently doing nothing.
        Cli::command().print_help()?;
        return Ok(ExitCode::from(1));
    };

    // Batch completion, not batch perfection, defines success: per-location
    // failures were logged, but the run finished.
    commands::run::run(&args, interval, &log)?;
    Ok(ExitCode::SUCCESS)
}
