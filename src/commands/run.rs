//! The snapshot batch command: one invocation, one interval, all locations.
use std::path::Path;

use anyhow::Result;

use crate::backend::BtrfsBackend;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::interval::Interval;
use crate::logging::Logger;
use crate::rotation::{Engine, RotationOpts, RunReport};

/// Load the configuration, falling back to the bundled default when the
/// file is missing or invalid.
///
/// # Errors
///
/// Only fails if the bundled default itself does not validate, which would
/// be a packaging bug.
pub fn load_config(path: &Path, log: &Logger) -> Result<Config> {
    match Config::load(path) {
        Ok(config) => {
            log.info(&format!("loaded config from {}", path.display()));
            Ok(config)
        }
        Err(e) => {
            log.error(&format!("{e}; loading defaults"));
            Ok(Config::bundled_default()?)
        }
    }
}

/// Run the rotation batch for one interval.
///
/// Per-location failures are logged and summarized but do not fail the
/// invocation: completing the batch, not completing it perfectly, is what
/// success means here. The next scheduled invocation retries naturally.
///
/// # Errors
///
/// Returns an error only for whole-process conditions (unloadable bundled
/// default configuration).
pub fn run(args: &crate::cli::Cli, interval: Interval, log: &Logger) -> Result<RunReport> {
    let config = load_config(&args.config, log)?;

    if !BtrfsBackend::available() {
        log.warn("btrfs tool not found on PATH; snapshot operations will fail");
    }

    let backend = BtrfsBackend;
    let clock = SystemClock::default();
    let engine = Engine::new(&backend, &clock, log);
    let report = engine.run(
        &config,
        &RotationOpts {
            interval,
            destination: args.destination.clone(),
        },
    );

    log.print_summary();
    if report.failure_count() > 0 {
        log.warn(&format!(
            "{} of {} locations had errors; see log for details",
            report.failure_count(),
            report.outcomes.len()
        ));
    }
    Ok(report)
}
