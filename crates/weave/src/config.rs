use crate::Result;

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use weave_core::{schema::DefineOptions, Value};

/// Configuration for building a [`Db`](crate::Db)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Delay between connect-and-sync attempts, in milliseconds
    pub retry_timeout: u64,

    /// Directory scanned for schema files
    pub schemas_dir: PathBuf,

    /// Defaults merged into every registered model
    pub define: DefineOptions,

    /// Passed through to the driver's `connect`
    pub connection: Value,

    /// Passed through to the schema sync
    pub sync: SyncOptions,

    /// How `fill` treats keys that are neither attributes nor associations
    pub fill_mode: FillMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Drop existing data before creating storage
    pub force: bool,

    /// Adjust existing storage to the registered attributes
    pub alter: bool,
}

/// Policy for unknown keys passed to `fill`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Keep unknown keys as pass-through values, e.g. through-table payloads
    #[default]
    Permissive,

    /// Reject unknown keys
    Strict,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry_timeout: 2000,
            schemas_dir: PathBuf::from("schemas"),
            define: DefineOptions::default(),
            connection: Value::Object(Default::default()),
            sync: SyncOptions::default(),
            fill_mode: FillMode::default(),
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document, merging it over the defaults.
    pub fn from_toml(src: &str) -> Result<Self> {
        let overrides: Value = toml::from_str(src).map_err(anyhow::Error::from)?;
        Self::default().merge(overrides)
    }

    /// Loads a TOML configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let src = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&src)
    }

    /// Deep-merges a partial document over this configuration. Tables merge
    /// key by key, anything else replaces the current value.
    ///
    /// Top-level keys may also use their camelCase spelling. Unknown
    /// top-level keys are an error.
    pub fn merge(&self, overrides: Value) -> Result<Self> {
        let mut merged = serde_json::to_value(self)?;
        merge_value(&mut merged, normalize_keys(overrides));
        Ok(serde_json::from_value(merged)?)
    }

    /// Set the retry delay
    pub fn retry_timeout(mut self, delay: Duration) -> Self {
        self.retry_timeout = delay.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Set the schema directory
    pub fn schemas_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.schemas_dir = path.into();
        self
    }

    pub fn define(mut self, define: DefineOptions) -> Self {
        self.define = define;
        self
    }

    /// Set the options handed to the driver's `connect`
    pub fn connection(mut self, connection: Value) -> Self {
        self.connection = connection;
        self
    }

    pub fn sync(mut self, sync: SyncOptions) -> Self {
        self.sync = sync;
        self
    }

    pub fn fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    /// Delay between connect-and-sync attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_timeout)
    }
}

/// camelCase spellings accepted for top-level keys
const ALIASES: &[(&str, &str)] = &[
    ("retryTimeout", "retry_timeout"),
    ("retryTimeoutMs", "retry_timeout"),
    ("schemasDir", "schemas_dir"),
    ("connectionOptions", "connection"),
    ("ormConnectionOptions", "connection"),
    ("syncOptions", "sync"),
    ("fillMode", "fill_mode"),
];

fn normalize_keys(overrides: Value) -> Value {
    let Value::Object(map) = overrides else {
        return overrides;
    };

    Value::Object(
        map.into_iter()
            .map(|(key, value)| {
                let key = ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == key)
                    .map(|(_, name)| name.to_string())
                    .unwrap_or(key);
                (key, value)
            })
            .collect(),
    )
}

fn merge_value(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(current) => merge_value(current, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}
