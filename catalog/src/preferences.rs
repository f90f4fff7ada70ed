use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::{Map, Value};

use crate::CatalogResult;

/// Preference holding the developer key, stored as JSON text.
pub const DEVELOPER_KEY: &str = "developerKey";

/// String preferences persisted as a JSON object file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    path: PathBuf,
    values: Map<String, Value>,
}

impl Preferences {
    /// `<config dir>/thingkit/preferences.json`, if the platform has a
    /// config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("thingkit").join("preferences.json"))
    }

    /// Read preferences from `path`. A missing file yields empty
    /// preferences.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`](crate::CatalogError::Io) if the file
    /// exists but cannot be read, and
    /// [`CatalogError::Json`](crate::CatalogError::Json) if it is not a JSON
    /// object.
    pub fn load(path: impl Into<PathBuf>) -> CatalogResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no preferences at {}", path.display());
                Map::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    /// File these preferences are saved to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The string stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Store `value` under `key`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_owned(), Value::String(value.into()));
    }

    /// Forget `key`.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Write the preferences back, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`](crate::CatalogError::Io) on write
    /// failure.
    pub fn save(&self) -> CatalogResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// The developer key, if one is set.
    ///
    /// The stored text is parsed as JSON and defaults to `null`. `null` and
    /// the empty string mean no key. Other non-string values are used in
    /// their JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`](crate::CatalogError::Json) if the
    /// stored text is not valid JSON.
    pub fn developer_key(&self) -> CatalogResult<Option<String>> {
        let raw = self.get(DEVELOPER_KEY).unwrap_or("null");
        let key = match serde_json::from_str::<Value>(raw)? {
            Value::Null => None,
            Value::String(key) => Some(key),
            other => Some(other.to_string()),
        };
        Ok(key.filter(|key| !key.is_empty()))
    }

    /// Store `key` as the developer key, or clear it with `None`.
    pub fn set_developer_key(&mut self, key: Option<&str>) {
        let text = key.map_or_else(
            || Value::Null.to_string(),
            |key| Value::from(key).to_string(),
        );
        self.set(DEVELOPER_KEY, text);
    }
}
