use thiserror::Error;

/// Errors that can occur when acquiring location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The provider connection failed, timed out, or was lost. Carries the
    /// provider's diagnostic text.
    #[error("{0}")]
    Connection(String),

    /// The host location settings cannot serve the request and the user did
    /// not fix them.
    #[error("Location services are disabled by the user")]
    SettingsDenied,

    /// A location sample could not be turned into a bridge record.
    #[error("failed to serialize location: {message}")]
    Serialization {
        /// What was wrong with the sample.
        message: String,
    },

    /// The configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for location operations.
pub type LocationResult<T> = Result<T, LocationError>;
