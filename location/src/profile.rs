use serde::{Deserialize, Serialize};

/// Accuracy/power trade-off requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Most accurate fix available, highest power use.
    HighAccuracy,
    /// Block-level accuracy.
    #[default]
    BalancedPowerAccuracy,
    /// City-level accuracy.
    LowPower,
    /// Only fixes other clients already caused.
    NoPower,
}

/// Requested interval and accuracy for location updates.
///
/// `min_interval_ms` is expected to be at least `fastest_interval_ms`; this
/// is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProfile {
    /// Preferred interval between updates.
    pub min_interval_ms: u64,
    /// Updates never arrive more often than this.
    pub fastest_interval_ms: u64,
    /// Accuracy/power trade-off.
    pub priority: Priority,
}

impl Default for UpdateProfile {
    fn default() -> Self {
        // don't ask for updates more than every 30 seconds, and rate limit
        // ourselves since the server side is rate limited anyway
        Self {
            min_interval_ms: 30_000,
            fastest_interval_ms: 5_000,
            priority: Priority::BalancedPowerAccuracy,
        }
    }
}
