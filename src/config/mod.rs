//! Declarative configuration: retention policies and subvolume locations.
//!
//! The config file is YAML. Retention policies are named and reusable;
//! locations reference them by YAML anchor, by name, or inline, or omit
//! them entirely to use the `default` policy. Validation is fail-fast and
//! explicit: every check is a key-membership or type check against the
//! schema, and the first violation wins so error output is deterministic.
//!
//! The loaded [`Config`] is an immutable value. It is produced once per
//! invocation and passed by reference to the rotation engine; nothing
//! mutates it afterwards.
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::ConfigError;
use crate::interval::Interval;

/// The bundled default configuration document, emitted verbatim by
/// `--create_config`.
pub const DEFAULT_CONFIG: &str = include_str!("default.yaml");

/// Per-interval snapshot retention counts. All six intervals are always
/// present; a count of 0 means "keep no snapshots of this interval".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub minute: u32,
    pub hourly: u32,
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub yearly: u32,
}

impl RetentionPolicy {
    /// The retention count for one interval.
    #[must_use]
    pub fn count(&self, interval: Interval) -> u32 {
        match interval {
            Interval::Minute => self.minute,
            Interval::Hourly => self.hourly,
            Interval::Daily => self.daily,
            Interval::Weekly => self.weekly,
            Interval::Monthly => self.monthly,
            Interval::Yearly => self.yearly,
        }
    }

    /// Validate a YAML mapping into a policy: all six interval keys must be
    /// present with non-negative integer counts.
    fn from_yaml(name: &str, value: &Value) -> Result<Self, ConfigError> {
        let mut counts = [0u32; 6];
        for (slot, interval) in counts.iter_mut().zip(Interval::ALL) {
            let raw = value
                .get(interval.as_str())
                .ok_or_else(|| ConfigError::IncompletePolicy {
                    policy: name.to_string(),
                    interval,
                })?;
            let count = raw
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| ConfigError::InvalidCount {
                    policy: name.to_string(),
                    interval,
                    value: display_value(raw),
                })?;
            *slot = count;
        }
        let [minute, hourly, daily, weekly, monthly, yearly] = counts;
        Ok(Self {
            minute,
            hourly,
            daily,
            weekly,
            monthly,
            yearly,
        })
    }
}

/// How a location selects its retention policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyRef {
    /// No policy given; the catalog's `default` entry applies.
    Default,
    /// Reference to a named catalog entry.
    Named(String),
    /// Policy written inline on the location (this is also what a YAML
    /// anchor reference becomes: the parser resolves it to a value copy).
    Inline(RetentionPolicy),
}

/// One subvolume to protect.
///
/// The mapping key under `locations` is the location's name, used only for
/// logging. Whether the subvolume path actually exists is checked when
/// snapshots are taken, not at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path of the subvolume root.
    pub subvolume: PathBuf,
    /// Retention policy selection.
    pub retention: PolicyRef,
}

impl Location {
    /// Validate one `locations` entry. A bare string is the condensed form;
    /// a mapping must carry a `subvolume` key and may carry `retention`.
    fn from_yaml(
        name: &str,
        value: &Value,
        catalog: &IndexMap<String, RetentionPolicy>,
    ) -> Result<Self, ConfigError> {
        let malformed = |reason: String| ConfigError::MalformedLocation {
            name: name.to_string(),
            reason,
        };

        match value {
            Value::String(path) => Ok(Self {
                subvolume: PathBuf::from(path),
                retention: PolicyRef::Default,
            }),
            Value::Mapping(_) => {
                let subvolume = value
                    .get("subvolume")
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed("missing 'subvolume' key".to_string()))?;

                let retention = match value.get("retention") {
                    None | Some(Value::Null) => PolicyRef::Default,
                    Some(Value::String(policy)) => {
                        if !catalog.contains_key(policy.as_str()) {
                            return Err(malformed(format!(
                                "unknown retention policy '{policy}'"
                            )));
                        }
                        PolicyRef::Named(policy.clone())
                    }
                    Some(inline @ Value::Mapping(_)) => {
                        let policy = RetentionPolicy::from_yaml(name, inline)
                            .map_err(|e| malformed(e.to_string()))?;
                        PolicyRef::Inline(policy)
                    }
                    Some(_) => {
                        return Err(malformed(
                            "'retention' must be a policy name or a mapping".to_string(),
                        ));
                    }
                };

                Ok(Self {
                    subvolume: PathBuf::from(subvolume),
                    retention,
                })
            }
            _ => Err(malformed(
                "must be a path string or a mapping with a 'subvolume' key".to_string(),
            )),
        }
    }
}

/// Loose top-level shape. Sections are optional here so their absence can be
/// reported as the specific validation error rather than a parse failure.
#[derive(Debug, Deserialize)]
struct RawConfig {
    retention: Option<IndexMap<String, Value>>,
    locations: Option<IndexMap<String, Value>>,
}

/// Validated, immutable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Named retention policies; always contains `default`.
    pub retention: IndexMap<String, RetentionPolicy>,
    /// Locations in config-file order.
    pub locations: IndexMap<String, Location>,
}

impl Config {
    /// Load and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in validation order: missing file,
    /// unreadable file, YAML parse failure, empty document, then the
    /// structural checks documented on [`ConfigError`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus the file-level cases.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let doc: Value =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if doc.is_null() {
            return Err(ConfigError::Empty);
        }
        let raw: RawConfig =
            serde_yaml::from_value(doc).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let raw_retention = raw.retention.ok_or(ConfigError::MissingRetention)?;
        if !raw_retention.contains_key("default") {
            return Err(ConfigError::MissingDefaultPolicy);
        }
        let mut retention = IndexMap::with_capacity(raw_retention.len());
        for (name, value) in &raw_retention {
            retention.insert(name.clone(), RetentionPolicy::from_yaml(name, value)?);
        }

        let raw_locations = raw.locations.ok_or(ConfigError::MissingLocations)?;
        if raw_locations.is_empty() {
            return Err(ConfigError::NoLocations);
        }
        let mut locations = IndexMap::with_capacity(raw_locations.len());
        for (name, value) in &raw_locations {
            locations.insert(name.clone(), Location::from_yaml(name, value, &retention)?);
        }

        Ok(Self {
            retention,
            locations,
        })
    }

    /// The bundled default configuration, valid by construction.
    ///
    /// # Errors
    ///
    /// Can only fail if the embedded document is broken, which the test
    /// suite rules out; callers propagate rather than unwrap.
    pub fn bundled_default() -> Result<Self, ConfigError> {
        Self::from_yaml_str(DEFAULT_CONFIG)
    }

    /// Resolve a location's effective retention policy.
    ///
    /// Pure lookup over already-validated data. A dangling reference is
    /// reported as [`ConfigError::RetentionLookup`] so the engine can skip
    /// the location instead of aborting the batch.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RetentionLookup`] when the referenced policy
    /// (or `default`) is absent from the catalog.
    pub fn resolve_retention<'a>(
        &'a self,
        location: &'a Location,
    ) -> Result<&'a RetentionPolicy, ConfigError> {
        match &location.retention {
            PolicyRef::Inline(policy) => Ok(policy),
            PolicyRef::Named(name) => self
                .retention
                .get(name)
                .ok_or_else(|| ConfigError::RetentionLookup(name.clone())),
            PolicyRef::Default => self
                .retention
                .get("default")
                .ok_or_else(|| ConfigError::RetentionLookup("default".to_string())),
        }
    }
}

/// Write the bundled default configuration to `path`, verbatim.
///
/// The containing directory is probed for writability before the write so
/// the error can name the directory, not just the failed file operation.
///
/// # Errors
///
/// [`ConfigError::DirectoryNotWritable`] when the directory is missing or
/// not writable; [`ConfigError::Io`] if the write itself fails.
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir_is_writable(dir) {
        return Err(ConfigError::DirectoryNotWritable(dir.to_path_buf()));
    }
    fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Check directory writability by creating and removing a probe file.
fn dir_is_writable(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    let probe = dir.join(".btrfs-snappy.write-probe");
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
    {
        Ok(file) => {
            drop(file);
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Render a scalar for error messages.
fn display_value(value: &Value) -> String {
    serde_yaml::to_string(value).map_or_else(|_| "?".to_string(), |s| s.trim().to_string())
}
