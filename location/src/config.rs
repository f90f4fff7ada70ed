use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{LocationError, LocationResult, UpdateProfile};

/// Upper bounds for the blocking steps of acquisition, in milliseconds.
///
/// `0` waits forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Connecting to the provider.
    pub connect_ms: u64,
    /// Each settings step: the provider check and the user's resolution.
    pub settings_ms: u64,
    /// The permission prompt.
    pub permission_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_ms: 30_000,
            settings_ms: 120_000,
            permission_ms: 120_000,
        }
    }
}

const fn bound(ms: u64) -> Option<Duration> {
    if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    }
}

impl Timeouts {
    /// Bound for connecting.
    #[must_use]
    pub const fn connect(&self) -> Option<Duration> {
        bound(self.connect_ms)
    }

    /// Bound for each settings step.
    #[must_use]
    pub const fn settings(&self) -> Option<Duration> {
        bound(self.settings_ms)
    }

    /// Bound for the permission prompt.
    #[must_use]
    pub const fn permission(&self) -> Option<Duration> {
        bound(self.permission_ms)
    }
}

/// Configuration of a [`LocationAcquisitionManager`](crate::LocationAcquisitionManager).
///
/// ```toml
/// [profile]
/// min_interval_ms = 30000
/// fastest_interval_ms = 5000
/// priority = "balanced-power-accuracy"
///
/// [timeouts]
/// connect_ms = 30000
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Profile used by `start` and `get_current_location`.
    pub profile: UpdateProfile,
    /// Bounds for blocking steps.
    pub timeouts: Timeouts,
}

impl LocationConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Config`] if the document is malformed.
    pub fn from_toml(document: &str) -> LocationResult<Self> {
        toml::from_str(document).map_err(|err| LocationError::Config(err.to_string()))
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Config`] if the file cannot be read or is
    /// malformed.
    pub fn load(path: impl AsRef<Path>) -> LocationResult<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|err| LocationError::Config(format!("{}: {err}", path.display())))?;
        Self::from_toml(&document)
    }
}
