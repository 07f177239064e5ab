//! The snapshot backend port and its btrfs adapter.
//!
//! The rotation engine issues two logical operations against the
//! filesystem's snapshot primitive. Modeling them as a trait keeps the
//! engine testable with a fake backend that records calls and simulates
//! failures instead of spawning real commands.
use std::path::Path;

use crate::error::BackendError;
use crate::exec;

/// Port to the filesystem's snapshot primitive.
pub trait SnapshotBackend: Send + Sync {
    /// Create a read-only snapshot of `source` at `destination`.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] carrying the exit status and diagnostic
    /// output when the external operation fails.
    fn create_readonly(&self, source: &Path, destination: &Path) -> Result<(), BackendError>;

    /// Delete the snapshot at `path`.
    ///
    /// # Errors
    ///
    /// Same failure reporting as [`SnapshotBackend::create_readonly`].
    fn delete(&self, path: &Path) -> Result<(), BackendError>;
}

/// Production backend that shells out to the `btrfs` tool.
#[derive(Debug, Default)]
pub struct BtrfsBackend;

impl BtrfsBackend {
    /// Whether the `btrfs` tool is available on PATH.
    #[must_use]
    pub fn available() -> bool {
        exec::which("btrfs")
    }

    fn run(args: &[&str]) -> Result<(), BackendError> {
        let result = exec::run_unchecked("btrfs", args).map_err(|e| BackendError::Spawn {
            program: "btrfs".to_string(),
            source: std::io::Error::other(format!("{e:#}")),
        })?;
        if result.success {
            Ok(())
        } else {
            Err(BackendError::CommandFailed {
                program: "btrfs".to_string(),
                code: result.code,
                output: result.combined_output(),
            })
        }
    }
}

impl SnapshotBackend for BtrfsBackend {
    fn create_readonly(&self, source: &Path, destination: &Path) -> Result<(), BackendError> {
        Self::run(&[
            "subvolume",
            "snapshot",
            "-r",
            &source.to_string_lossy(),
            &destination.to_string_lossy(),
        ])
    }

    fn delete(&self, path: &Path) -> Result<(), BackendError> {
        Self::run(&["subvolume", "delete", &path.to_string_lossy()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_trait_is_object_safe() {
        fn assert_obj(_: &dyn SnapshotBackend) {}
        assert_obj(&BtrfsBackend);
    }

    #[test]
    fn missing_btrfs_reports_an_error_not_a_panic() {
        // In environments without the btrfs tool this is a Spawn error; with
        // it, a CommandFailed against a path that is not a subvolume. Either
        // way the call must return an error value.
        if !BtrfsBackend::available() {
            let result = BtrfsBackend.delete(Path::new("/definitely/not/a/subvolume"));
            assert!(result.is_err());
        }
    }
}
