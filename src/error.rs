//! Domain-specific error types for the snapshot engine.
//!
//! Internal modules return typed errors ([`ConfigError`], [`BackendError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! Every configuration validation step has its own [`ConfigError`] variant,
//! in the order validation runs, so the first violation found names exactly
//! what is wrong with the file.

use std::path::PathBuf;

use thiserror::Error;

use crate::interval::Interval;

/// Errors from configuration loading, validation, and default emission.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file does not exist. Recoverable: the caller falls back to
    /// the bundled default configuration.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while reading or writing a config file.
    #[error("io error on config file {path}: {source}")]
    Io {
        /// Path of the file that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file exists but is not valid YAML.
    #[error("config file is not valid YAML: {0}")]
    Parse(String),

    /// The file parsed to an empty document.
    #[error("config file is empty")]
    Empty,

    /// The `retention` section is absent.
    #[error("retention section in config file could not be found")]
    MissingRetention,

    /// The retention catalog has no `default` entry.
    #[error("retention section has no 'default' policy")]
    MissingDefaultPolicy,

    /// A retention policy is missing the count for one of the six intervals.
    #[error("retention policy '{policy}' is missing a count for '{interval}'")]
    IncompletePolicy {
        /// Name of the incomplete policy.
        policy: String,
        /// The interval whose count is absent.
        interval: Interval,
    },

    /// A retention count is negative or not an integer.
    #[error("retention policy '{policy}' has an invalid count for '{interval}': {value}")]
    InvalidCount {
        /// Name of the offending policy.
        policy: String,
        /// The interval whose count is invalid.
        interval: Interval,
        /// The raw value as written in the file.
        value: String,
    },

    /// The `locations` section is absent.
    #[error("locations section in config file could not be found")]
    MissingLocations,

    /// The `locations` section exists but defines no locations.
    #[error("you must have at least one subvolume location defined")]
    NoLocations,

    /// A location entry is neither a bare path nor a valid explicit mapping.
    #[error("location '{name}' is malformed: {reason}")]
    MalformedLocation {
        /// Mapping key of the offending location.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A retention policy referenced by name has no catalog entry.
    ///
    /// Validation rejects dangling references at load time, so hitting this
    /// at rotation time means the catalog and the location disagree; the
    /// engine skips the location rather than aborting the batch.
    #[error("retention policy '{0}' is not defined in the retention section")]
    RetentionLookup(String),

    /// The directory that should hold the config file is not writable.
    ///
    /// Raised by the explicit config-write operation only, and fatal to it.
    #[error("you do not have write permissions to directory {0}")]
    DirectoryNotWritable(PathBuf),
}

/// Errors from the external snapshot backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The external tool could not be spawned at all.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that could not be started.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The external tool ran but exited non-zero.
    #[error("{program} failed (exit {code:?}): {output}")]
    CommandFailed {
        /// Program that failed.
        program: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Combined diagnostic output, trimmed.
        output: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn not_found_display_names_path() {
        let e = ConfigError::NotFound(PathBuf::from("/etc/btrfs-snappy.conf"));
        assert_eq!(
            e.to_string(),
            "config file not found: /etc/btrfs-snappy.conf"
        );
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/btrfs-snappy.conf"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/etc/btrfs-snappy.conf"));
    }

    #[test]
    fn incomplete_policy_display_names_policy_and_interval() {
        let e = ConfigError::IncompletePolicy {
            policy: "short_term".to_string(),
            interval: Interval::Weekly,
        };
        assert_eq!(
            e.to_string(),
            "retention policy 'short_term' is missing a count for 'weekly'"
        );
    }

    #[test]
    fn malformed_location_display() {
        let e = ConfigError::MalformedLocation {
            name: "home".to_string(),
            reason: "missing 'subvolume' key".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "location 'home' is malformed: missing 'subvolume' key"
        );
    }

    #[test]
    fn directory_not_writable_display_names_directory() {
        let e = ConfigError::DirectoryNotWritable(PathBuf::from("/etc"));
        assert_eq!(
            e.to_string(),
            "you do not have write permissions to directory /etc"
        );
    }

    #[test]
    fn command_failed_display_includes_code_and_output() {
        let e = BackendError::CommandFailed {
            program: "btrfs".to_string(),
            code: Some(1),
            output: "ERROR: not a subvolume".to_string(),
        };
        assert!(e.to_string().contains("exit Some(1)"));
        assert!(e.to_string().contains("not a subvolume"));
    }

    #[test]
    fn spawn_error_has_source() {
        use std::error::Error as StdError;
        let e = BackendError::Spawn {
            program: "btrfs".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.source().is_some());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn error_types_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<BackendError>();
    }

    #[test]
    fn config_error_converts_to_anyhow() {
        let e = ConfigError::Empty;
        let _anyhow_err: anyhow::Error = e.into();
    }
}
