//! The rotation engine: create one snapshot per location, purge the excess.
//!
//! One invocation handles exactly one interval. Locations are processed
//! sequentially in config order, and every failure is isolated to the
//! location (or the single snapshot) it occurred on: the engine always
//! visits all locations before returning. There are no retries; the next
//! scheduled invocation is the retry mechanism.
use std::fs;
use std::path::PathBuf;

use crate::backend::SnapshotBackend;
use crate::clock::Clock;
use crate::config::{Config, Location};
use crate::interval::Interval;
use crate::inventory::{self, TIMESTAMP_FORMAT};
use crate::logging::{LocationStatus, Logger};

/// Per-invocation rotation parameters.
#[derive(Debug, Clone)]
pub struct RotationOpts {
    /// The interval this invocation fires for.
    pub interval: Interval,
    /// Snapshot destination subdirectory, relative to each subvolume root.
    pub destination: PathBuf,
}

/// What happened to one location during a run.
#[derive(Debug)]
pub struct LocationOutcome {
    /// Location name (config mapping key).
    pub name: String,
    /// Subvolume path.
    pub subvolume: PathBuf,
    /// Reason the location was skipped before any snapshot work, if it was.
    pub skipped: Option<String>,
    /// Path of the newly created snapshot, if one was created.
    pub created: Option<PathBuf>,
    /// Number of snapshots successfully purged.
    pub purged: usize,
    /// Errors encountered; the batch continued past each of them.
    pub errors: Vec<String>,
}

impl LocationOutcome {
    fn new(name: &str, subvolume: &std::path::Path) -> Self {
        Self {
            name: name.to_string(),
            subvolume: subvolume.to_path_buf(),
            skipped: None,
            created: None,
            purged: 0,
            errors: Vec::new(),
        }
    }

    /// Collapse the outcome into a summary status.
    #[must_use]
    pub fn status(&self) -> LocationStatus {
        if !self.errors.is_empty() {
            LocationStatus::Failed
        } else if self.skipped.is_some() {
            LocationStatus::Skipped
        } else {
            LocationStatus::Ok
        }
    }
}

/// Result of one whole invocation.
#[derive(Debug)]
pub struct RunReport {
    /// One outcome per configured location, in processing order.
    pub outcomes: Vec<LocationOutcome>,
}

impl RunReport {
    /// Number of locations that encountered at least one error.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status() == LocationStatus::Failed)
            .count()
    }
}

/// The rotation engine, wired to its collaborators through ports.
pub struct Engine<'a> {
    backend: &'a dyn SnapshotBackend,
    clock: &'a dyn Clock,
    log: &'a Logger,
}

impl<'a> Engine<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn SnapshotBackend, clock: &'a dyn Clock, log: &'a Logger) -> Self {
        Self {
            backend,
            clock,
            log,
        }
    }

    /// Process every configured location for the requested interval.
    ///
    /// Never aborts early: per-location failures are recorded in the report
    /// and in the logger, and the remaining locations still run.
    pub fn run(&self, config: &Config, opts: &RotationOpts) -> RunReport {
        let mut outcomes = Vec::with_capacity(config.locations.len());
        for (name, location) in &config.locations {
            let outcome = self.rotate_location(config, name, location, opts);
            let message = summary_message(&outcome);
            self.log
                .record_location(name, outcome.status(), message.as_deref());
            outcomes.push(outcome);
        }
        RunReport { outcomes }
    }

    fn rotate_location(
        &self,
        config: &Config,
        name: &str,
        location: &Location,
        opts: &RotationOpts,
    ) -> LocationOutcome {
        let mut outcome = LocationOutcome::new(name, &location.subvolume);
        let subvolume = &location.subvolume;

        if !subvolume.is_dir() {
            let reason = format!("subvolume '{}' does not exist", subvolume.display());
            self.log.error(&reason);
            outcome.skipped = Some(reason);
            return outcome;
        }

        let policy = match config.resolve_retention(location) {
            Ok(policy) => policy,
            Err(e) => {
                let reason = e.to_string();
                self.log.error(&format!("{name}: {reason}"));
                outcome.skipped = Some(reason);
                return outcome;
            }
        };
        let retention = policy.count(opts.interval);

        self.log.info(&format!(
            "snapshotting {} ({name}): {} retention is {retention}",
            subvolume.display(),
            opts.interval,
        ));

        if retention == 0 {
            // Keep none: no new snapshot, and the purge below removes any
            // that remain from when this interval was still enabled.
            self.log.warn(&format!(
                "retention for '{name}' {} is 0, skipping snapshot creation",
                opts.interval,
            ));
        } else {
            self.create_snapshot(&mut outcome, opts);
        }

        self.purge_excess(&mut outcome, opts, retention);
        outcome
    }

    fn create_snapshot(&self, outcome: &mut LocationOutcome, opts: &RotationOpts) {
        let destination_dir = outcome.subvolume.join(&opts.destination);
        if let Err(e) = fs::create_dir_all(&destination_dir) {
            let msg = format!(
                "cannot create snapshot directory {}: {e}",
                destination_dir.display()
            );
            self.log.error(&msg);
            outcome.errors.push(msg);
            return;
        }

        let timestamp = self.clock.now().format(TIMESTAMP_FORMAT);
        let snapshot = destination_dir.join(format!("{}_{timestamp}", opts.interval));
        self.log.debug(&format!(
            "creating read-only snapshot {}",
            snapshot.display()
        ));

        match self.backend.create_readonly(&outcome.subvolume, &snapshot) {
            Ok(()) => {
                self.log.info(&format!("created {}", snapshot.display()));
                outcome.created = Some(snapshot);
            }
            Err(e) => {
                let msg = format!("snapshot creation failed: {e}");
                self.log.error(&msg);
                outcome.errors.push(msg);
            }
        }
    }

    /// Delete the oldest snapshots beyond `retention`, each independently.
    fn purge_excess(&self, outcome: &mut LocationOutcome, opts: &RotationOpts, retention: u32) {
        let snapshots =
            match inventory::list(&outcome.subvolume, &opts.destination, opts.interval) {
                Ok(snapshots) => snapshots,
                Err(e) => {
                    let msg = format!("cannot list snapshots: {e}");
                    self.log.error(&msg);
                    outcome.errors.push(msg);
                    return;
                }
            };

        let excess = snapshots.len().saturating_sub(retention as usize);
        for victim in snapshots.iter().take(excess) {
            match self.backend.delete(&victim.path) {
                Ok(()) => {
                    self.log.info(&format!("purged {}", victim.path.display()));
                    outcome.purged += 1;
                }
                Err(e) => {
                    // Keep attempting the remaining victims.
                    let msg = format!("failed to purge {}: {e}", victim.path.display());
                    self.log.error(&msg);
                    outcome.errors.push(msg);
                }
            }
        }
    }
}

fn summary_message(outcome: &LocationOutcome) -> Option<String> {
    if let Some(reason) = &outcome.skipped {
        return Some(reason.clone());
    }
    if outcome.errors.is_empty() {
        Some(format!(
            "created {}, purged {}",
            usize::from(outcome.created.is_some()),
            outcome.purged
        ))
    } else {
        Some(outcome.errors.join("; "))
    }
}
