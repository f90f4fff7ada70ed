//! Runtime permission handling.
//!
//! This crate models the runtime permissions a host grants to the engine and
//! provides a [`Gatekeeper`] that asks the user for a missing grant before a
//! protected call is made.
//!
//! The host decides what "granted" means. It answers [`PermissionHost::check`]
//! every time it is asked; nothing here caches a grant.

#![warn(missing_docs)]

/// Best-effort permission acquisition.
pub mod gatekeeper;

/// In-memory grant table usable as a [`PermissionHost`].
pub mod grants;

use std::str::FromStr;

pub use gatekeeper::Gatekeeper;
pub use grants::GrantTable;

/// Types of permissions that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Permission {
    /// Precise device location.
    FineLocation,
    /// Approximate device location.
    CoarseLocation,
    /// Access to device camera.
    Camera,
    /// Access to device microphone.
    Microphone,
    /// Access to contacts.
    Contacts,
    /// Access to calendar.
    Calendar,
}

impl Permission {
    /// The host identifier of this permission.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Self::Camera => "android.permission.CAMERA",
            Self::Microphone => "android.permission.RECORD_AUDIO",
            Self::Contacts => "android.permission.READ_CONTACTS",
            Self::Calendar => "android.permission.READ_CALENDAR",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Permission {
    type Err = PermissionError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        [
            Self::FineLocation,
            Self::CoarseLocation,
            Self::Camera,
            Self::Microphone,
            Self::Contacts,
            Self::Calendar,
        ]
        .into_iter()
        .find(|permission| permission.id() == id)
        .ok_or_else(|| PermissionError::UnknownPermission(id.to_owned()))
    }
}

/// The current status of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied by the user.
    Denied,
    /// The host could not tell, or the permission was never requested.
    Unknown,
}

impl PermissionStatus {
    /// Whether the permission can be used right now.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Errors that can occur when handling permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// The permission identifier is not one this crate knows about.
    #[error("unknown permission: {0}")]
    UnknownPermission(String),
}

/// The host environment's view of granted permissions.
pub trait PermissionHost: Send + Sync {
    /// Query the current status of a permission.
    fn check(&self, permission: Permission) -> PermissionStatus;
}

/// A UI collaborator able to ask the user for a permission.
///
/// Implementations block until the prompt is dismissed. The outcome is not
/// returned; callers observe it by querying the [`PermissionHost`] again.
pub trait PermissionPrompt: Send + Sync {
    /// Ask the user to grant `permission`. `request_code` identifies the
    /// request to the host UI.
    fn request_permission(&self, permission: Permission, request_code: i32);
}
