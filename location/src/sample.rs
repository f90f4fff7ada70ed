use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LocationError, LocationResult};

/// A location fix reported by the provider.
///
/// Serializes to the bridge record
/// `{latitude, longitude, altitude, bearing, provider, speed, time}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Altitude in meters above the WGS84 ellipsoid.
    pub altitude: f64,
    /// Direction of travel in degrees.
    pub bearing: f32,
    /// Name of the provider that produced the fix.
    pub provider: String,
    /// Speed over ground in meters per second.
    #[serde(rename = "speed")]
    pub speed_mps: f32,
    /// Time of the fix as Unix epoch milliseconds.
    #[serde(rename = "time")]
    pub timestamp_ms: i64,
}

impl LocationSample {
    /// Convert to the record delivered across the bridge.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Serialization`] if a coordinate is not a
    /// finite number.
    pub fn to_record(&self) -> LocationResult<Value> {
        let finite = [self.latitude, self.longitude, self.altitude]
            .iter()
            .all(|value| value.is_finite())
            && self.bearing.is_finite()
            && self.speed_mps.is_finite();
        if !finite {
            return Err(LocationError::Serialization {
                message: format!(
                    "non-finite field in fix from {} at {}",
                    self.provider, self.timestamp_ms
                ),
            });
        }

        serde_json::to_value(self).map_err(|err| LocationError::Serialization {
            message: err.to_string(),
        })
    }
}
