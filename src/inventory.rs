//! Enumeration and chronological ordering of existing snapshots.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::interval::Interval;

/// Timestamp layout used in snapshot names: ISO-8601 local time with
/// optional fractional seconds, e.g. `2026-08-30T14:05:00.123456`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// An existing snapshot, identified by the timestamp parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Full path of the snapshot directory.
    pub path: PathBuf,
    /// Creation time, parsed from the name (never from fs metadata, so the
    /// ordering is reproducible regardless of filesystem timestamp
    /// granularity or clock skew at copy time).
    pub timestamp: NaiveDateTime,
}

/// List the snapshots for one (subvolume, interval) pair, oldest first.
///
/// Scans `<subvolume>/<destination>/` for entries named
/// `<interval>_<timestamp>`. Entries that do not match the pattern belong to
/// other intervals or other tools and are ignored entirely. A missing
/// destination directory is the normal first-run state and yields an empty
/// list.
///
/// # Errors
///
/// Returns an error only when the destination directory exists but cannot
/// be read.
pub fn list(
    subvolume: &Path,
    destination: &Path,
    interval: Interval,
) -> io::Result<Vec<Snapshot>> {
    let dir = subvolume.join(destination);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let prefix = format!("{interval}_");
    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(raw_ts) = name.strip_prefix(&prefix) else {
            continue;
        };
        let Ok(timestamp) = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT) else {
            continue;
        };
        snapshots.push(Snapshot {
            path: entry.path(),
            timestamp,
        });
    }

    snapshots.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.path.cmp(&b.path)));
    Ok(snapshots)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn make_snapshot_dir(subvol: &Path, name: &str) {
        fs::create_dir_all(subvol.join(".snapshots").join(name)).unwrap();
    }

    #[test]
    fn missing_destination_directory_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = list(dir.path(), Path::new(".snapshots"), Interval::Hourly).unwrap();
        assert!(snapshots.is_empty());
    }

    #[test]
    fn lists_only_matching_interval() {
        let dir = tempfile::tempdir().unwrap();
        make_snapshot_dir(dir.path(), "hourly_2026-08-30T10:00:00");
        make_snapshot_dir(dir.path(), "daily_2026-08-30T00:00:00");
        make_snapshot_dir(dir.path(), "hourly_2026-08-30T11:00:00");

        let snapshots = list(dir.path(), Path::new(".snapshots"), Interval::Hourly).unwrap();
        assert_eq!(snapshots.len(), 2);
        let daily = list(dir.path(), Path::new(".snapshots"), Interval::Daily).unwrap();
        assert_eq!(daily.len(), 1);
    }

    #[test]
    fn ignores_entries_that_do_not_parse() {
        let dir = tempfile::tempdir().unwrap();
        make_snapshot_dir(dir.path(), "hourly_2026-08-30T10:00:00");
        make_snapshot_dir(dir.path(), "hourly_not-a-timestamp");
        make_snapshot_dir(dir.path(), "hourly_");
        make_snapshot_dir(dir.path(), "unrelated");
        fs::write(dir.path().join(".snapshots").join("stray-file"), b"x").unwrap();

        let snapshots = list(dir.path(), Path::new(".snapshots"), Interval::Hourly).unwrap();
        assert_eq!(snapshots.len(), 1);
    }

    #[test]
    fn orders_by_name_timestamp_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        // Created out of order on purpose; mtime order differs from name order.
        make_snapshot_dir(dir.path(), "hourly_2026-08-30T12:00:00");
        make_snapshot_dir(dir.path(), "hourly_2026-08-29T12:00:00");
        make_snapshot_dir(dir.path(), "hourly_2026-08-30T06:30:00");

        let snapshots = list(dir.path(), Path::new(".snapshots"), Interval::Hourly).unwrap();
        let names: Vec<String> = snapshots
            .iter()
            .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "hourly_2026-08-29T12:00:00",
                "hourly_2026-08-30T06:30:00",
                "hourly_2026-08-30T12:00:00",
            ]
        );
    }

    #[test]
    fn fractional_second_timestamps_parse_and_order() {
        let dir = tempfile::tempdir().unwrap();
        make_snapshot_dir(dir.path(), "minute_2026-08-30T10:00:00.000002");
        make_snapshot_dir(dir.path(), "minute_2026-08-30T10:00:00.000001");

        let snapshots = list(dir.path(), Path::new(".snapshots"), Interval::Minute).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].timestamp < snapshots[1].timestamp);
    }

    #[test]
    fn custom_destination_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("snaps/weekly_2026-08-24T00:00:00")).unwrap();

        let snapshots = list(dir.path(), Path::new("snaps"), Interval::Weekly).unwrap();
        assert_eq!(snapshots.len(), 1);
    }
}
