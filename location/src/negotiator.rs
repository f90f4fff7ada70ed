use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::blocking::wait_bounded;
use crate::{
    ConnectionManager, ENABLE_GPS, InteractionCallback, LocationError, LocationResult,
    ResolutionToken, SettingsStatus, UpdateProfile,
};

/// An update profile the host settings are known to satisfy.
///
/// Only [`SettingsNegotiator::negotiate`] hands these out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    profile: UpdateProfile,
}

impl ValidatedRequest {
    pub(crate) const fn new(profile: UpdateProfile) -> Self {
        Self { profile }
    }

    /// The validated profile.
    #[must_use]
    pub const fn profile(&self) -> &UpdateProfile {
        &self.profile
    }
}

/// Checks host location settings against a profile, letting the user fix
/// them when the provider says that is possible.
#[derive(Debug, Clone)]
pub struct SettingsNegotiator {
    timeout: Option<Duration>,
}

impl SettingsNegotiator {
    /// Create a negotiator that waits at most `timeout` for each blocking
    /// step (provider check, user resolution).
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Validate `profile` against the host settings.
    ///
    /// Blocks until the provider (and the user, if asked) has answered.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::SettingsDenied`] when the settings are
    /// insufficient and were not fixed, or when no answer arrives in time.
    /// Returns [`LocationError::Connection`] when the provider cannot be
    /// reached.
    pub fn negotiate(
        &self,
        connection: &ConnectionManager,
        profile: &UpdateProfile,
        interaction: Option<Arc<dyn InteractionCallback>>,
    ) -> LocationResult<ValidatedRequest> {
        let Some(status) = connection.check_settings(profile, self.timeout)? else {
            warn!("location settings check timed out");
            return Err(LocationError::SettingsDenied);
        };

        match status {
            SettingsStatus::Satisfied => Ok(ValidatedRequest::new(*profile)),
            SettingsStatus::ResolutionRequired(token) => {
                if self.resolve(token, interaction) {
                    Ok(ValidatedRequest::new(*profile))
                } else {
                    Err(LocationError::SettingsDenied)
                }
            }
            SettingsStatus::Unresolvable { code, message } => {
                debug!("location settings unresolvable ({code}): {message}");
                Err(LocationError::SettingsDenied)
            }
        }
    }

    fn resolve(
        &self,
        token: ResolutionToken,
        interaction: Option<Arc<dyn InteractionCallback>>,
    ) -> bool {
        let Some(interaction) = interaction else {
            debug!("location settings need resolution but no UI is attached");
            return false;
        };

        let resolved = wait_bounded(self.timeout, move || {
            interaction.resolve_settings(&token, ENABLE_GPS)
        });
        resolved.unwrap_or_else(|| {
            warn!("location settings resolution timed out");
            false
        })
    }
}
