//! Settings loaded from a TOML file.
//!
//! Nested tables are flattened to dotted keys:
//!
//! ```toml
//! [buddypress]
//! enabled = true
//! default_admin_sync_to = "bidirectional"
//! ```
//!
//! reads as `buddypress.enabled` and `buddypress.default_admin_sync_to`.

use crate::error::StoreResult;
use groupbridge_sync::SettingsReader;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Read-only settings backed by a TOML document.
#[derive(Debug, Clone, Default)]
pub struct FileSettings {
    values: BTreeMap<String, Value>,
    source: Option<PathBuf>,
}

impl FileSettings {
    /// Loads settings from `path`.
    ///
    /// A missing file yields empty settings, so every policy reads as off.
    /// An unreadable or unparseable file also yields empty settings, with a
    /// warning.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !path.exists() {
            info!("No settings file found at {:?}, sync disabled", path);
            return Self::default();
        }

        match Self::try_load(&path) {
            Ok(settings) => {
                info!("Loaded {} settings from {:?}", settings.len(), path);
                settings
            }
            Err(e) => {
                warn!(
                    "Failed to load settings file {:?}: {}. Falling back to defaults.",
                    path, e
                );
                Self {
                    values: BTreeMap::new(),
                    source: Some(path),
                }
            }
        }
    }

    /// Reads and parses `path`, reporting IO and parse failures.
    pub fn try_load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut settings = Self::from_toml_str(&contents)?;
        settings.source = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Parses settings from TOML text.
    pub fn from_toml_str(contents: &str) -> StoreResult<Self> {
        let table: toml::Table = toml::from_str(contents)?;
        let mut values = BTreeMap::new();
        for (key, value) in table {
            flatten_into(&mut values, key, value)?;
        }
        Ok(Self {
            values,
            source: None,
        })
    }

    /// Builds settings from already-flattened key/value pairs.
    pub fn with_values<K, I>(values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            source: None,
        }
    }

    /// The file these settings were read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// All dotted keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsReader for FileSettings {
    fn get(&self, key: &str) -> Value {
        self.values.get(key).cloned().unwrap_or(Value::Null)
    }
}

fn flatten_into(out: &mut BTreeMap<String, Value>, key: String, value: toml::Value) -> StoreResult<()> {
    match value {
        toml::Value::Table(table) => {
            for (child, value) in table {
                flatten_into(out, format!("{key}.{child}"), value)?;
            }
        }
        // Datetimes have no JSON form; keep their TOML text.
        toml::Value::Datetime(dt) => {
            out.insert(key, Value::String(dt.to_string()));
        }
        other => {
            out.insert(key, serde_json::to_value(other)?);
        }
    }
    Ok(())
}
