//! Structured logger with quiet-mode awareness and batch summary collection.
//!
//! Every message is emitted as a [`tracing`] event and captured by a
//! persistent file sink (`/var/log/btrfs-snappy.log` when writable, otherwise
//! `$XDG_CACHE_HOME/btrfs-snappy/btrfs-snappy.log`). Console echo of info and
//! warning lines is suppressed by `--quiet`; the file sink receives all
//! messages regardless.
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

/// Outcome of one location's rotation, for summary reporting.
#[derive(Debug, Clone)]
pub struct LocationEntry {
    /// Location name (the config mapping key).
    pub name: String,
    /// Final status of the location.
    pub status: LocationStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a processed location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    /// Snapshot rotation completed without errors.
    Ok,
    /// Location was skipped (missing subvolume, retention lookup failure).
    Skipped,
    /// One or more operations on the location failed.
    Failed,
}

/// Resolve the log file path, creating parent directories as needed.
///
/// Prefers the system log directory; falls back to the user cache directory
/// when `/var/log` is not writable by the current user.
fn log_file_path() -> Option<PathBuf> {
    let system = PathBuf::from("/var/log/btrfs-snappy.log");
    if fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&system)
        .is_ok()
    {
        return Some(system);
    }

    let cache_dir = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".cache")))
        .ok()?;
    let dir = cache_dir.join("btrfs-snappy");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("btrfs-snappy.log"))
}

/// Install the global file sink for [`tracing`] events.
///
/// Returns the log file path, or `None` when no writable location exists (in
/// which case events are simply dropped; console echo still works).
pub fn init_file_sink() -> Option<PathBuf> {
    let path = log_file_path()?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let version = env!("CARGO_PKG_VERSION");
    let _ = writeln!(
        file,
        "---- btrfs-snappy {version} {} ----",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
    );

    // try_init rather than init: tests may install a sink more than once.
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .try_init();
    Some(path)
}

/// Quiet-aware logger that mirrors messages to the console and records
/// per-location outcomes for the end-of-run summary.
#[derive(Debug)]
pub struct Logger {
    quiet: bool,
    locations: Mutex<Vec<LocationEntry>>,
}

impl Logger {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            locations: Mutex::new(Vec::new()),
        }
    }

    /// Log an error message. Errors always reach the console (on stderr).
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
        eprintln!("ERROR {msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
        if !self.quiet {
            println!("WARN  {msg}");
        }
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
        if !self.quiet {
            println!("{msg}");
        }
    }

    /// Log a debug message (file sink only).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a location outcome for the summary.
    pub fn record_location(&self, name: &str, status: LocationStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.locations.lock() {
            guard.push(LocationEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the locations that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.locations.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|e| e.status == LocationStatus::Failed)
                .count()
        })
    }

    /// Return a clone of all recorded location entries.
    #[must_use]
    pub fn location_entries(&self) -> Vec<LocationEntry> {
        self.locations.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Print the summary of all recorded locations.
    pub fn print_summary(&self) {
        let entries = self.location_entries();
        if entries.is_empty() {
            return;
        }

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for entry in &entries {
            let mark = match entry.status {
                LocationStatus::Ok => {
                    ok += 1;
                    "ok"
                }
                LocationStatus::Skipped => {
                    skipped += 1;
                    "skipped"
                }
                LocationStatus::Failed => {
                    failed += 1;
                    "failed"
                }
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{mark}: {}{suffix}", entry.name));
        }

        let total = ok + skipped + failed;
        self.info(&format!(
            "{total} locations: {ok} ok, {skipped} skipped, {failed} failed"
        ));
    }
}
