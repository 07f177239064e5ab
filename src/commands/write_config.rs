//! The `--create_config` command.
use std::path::Path;

use anyhow::Result;

use crate::config;
use crate::logging::Logger;

/// Write the bundled default configuration to `path` and report it.
///
/// # Errors
///
/// Fails when the containing directory is not writable or the write itself
/// fails; this is the one per-process fatal condition, so the error
/// propagates and the process exits non-zero.
pub fn run(path: &Path, log: &Logger) -> Result<()> {
    config::write_default(path)?;
    log.info(&format!("wrote default config to {}", path.display()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snappy.conf");
        run(&path, &Logger::new(true)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            config::DEFAULT_CONFIG
        );
    }

    #[test]
    fn unwritable_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("snappy.conf");
        assert!(run(&path, &Logger::new(true)).is_err());
    }
}
