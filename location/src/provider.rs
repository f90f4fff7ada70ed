use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::{LocationSample, UpdateProfile};

/// Callback invoked by the provider on its callback thread for every update.
///
/// `None` means the provider delivered an update without a usable fix.
pub type SampleCallback = Arc<dyn Fn(Option<LocationSample>) + Send + Sync>;

/// Failure reported by the location provider, with its diagnostic text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    /// The provider's diagnostic message.
    pub message: String,
}

impl ProviderError {
    /// Create an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Opaque token the UI collaborator uses to resolve a settings problem.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResolutionToken(String);

impl ResolutionToken {
    /// Wrap a provider-issued resolution token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResolutionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResolutionToken").field(&self.0).finish()
    }
}

/// The provider's verdict on whether host settings satisfy a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsStatus {
    /// The settings already satisfy the profile.
    Satisfied,
    /// The user can fix the settings; hand the token to the UI.
    ResolutionRequired(ResolutionToken),
    /// The settings cannot be fixed from here.
    Unresolvable {
        /// Provider status code.
        code: i32,
        /// Provider status message.
        message: String,
    },
}

/// A connection-oriented platform location service.
///
/// All calls may block. Update callbacks are delivered on a thread owned by
/// the provider.
pub trait LocationProvider: Send + Sync {
    /// Connect to the service, blocking until the outcome is known.
    ///
    /// # Errors
    ///
    /// Returns the provider's diagnostic when the connection fails.
    fn connect(&self) -> Result<(), ProviderError>;

    /// Tear the connection down.
    fn disconnect(&self);

    /// Check whether the host's location settings can serve `profile`.
    ///
    /// # Errors
    ///
    /// Fails when the provider is unreachable, e.g. not connected.
    fn check_settings(&self, profile: &UpdateProfile) -> Result<SettingsStatus, ProviderError>;

    /// Start delivering updates for `profile` to `callback`, replacing any
    /// earlier registration.
    ///
    /// # Errors
    ///
    /// Fails when the provider refuses the registration, e.g. without the
    /// location permission.
    fn request_updates(
        &self,
        profile: &UpdateProfile,
        callback: SampleCallback,
    ) -> Result<(), ProviderError>;

    /// Stop delivering updates.
    ///
    /// # Errors
    ///
    /// Fails when the provider is unreachable.
    fn remove_updates(&self) -> Result<(), ProviderError>;

    /// The most recent fix the provider has cached, if any.
    ///
    /// # Errors
    ///
    /// Fails when the provider is unreachable or the permission is missing.
    fn last_location(&self) -> Result<Option<LocationSample>, ProviderError>;
}
