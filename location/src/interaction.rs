use thingkit_permission::PermissionPrompt;

use crate::ResolutionToken;

/// Request code passed along when asking the user to enable location.
pub const ENABLE_GPS: i32 = 1;

/// Request code passed along when asking for the location permission.
pub const REQUEST_GPS: i32 = 2;

/// The UI side of the host: shows prompts and reports back.
///
/// Every method blocks until the user has answered.
pub trait InteractionCallback: PermissionPrompt {
    /// Let the user fix the location settings described by `token`.
    ///
    /// Returns `true` if the settings were fixed.
    fn resolve_settings(&self, token: &ResolutionToken, request_code: i32) -> bool;
}
