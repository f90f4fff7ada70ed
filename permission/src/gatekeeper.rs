use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::{Permission, PermissionHost, PermissionPrompt, PermissionStatus};

/// Makes sure a permission is granted before a protected call, if the user
/// agrees.
///
/// The gatekeeper never fails. When the grant is still missing after the
/// prompt, the protected call is expected to fail on its own with whatever
/// error the host raises for it.
#[derive(Clone)]
pub struct Gatekeeper {
    host: Arc<dyn PermissionHost>,
}

impl fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gatekeeper").finish_non_exhaustive()
    }
}

impl Gatekeeper {
    /// Create a gatekeeper backed by `host`.
    #[must_use]
    pub fn new(host: Arc<dyn PermissionHost>) -> Self {
        Self { host }
    }

    /// Current status of `permission`, queried from the host.
    #[must_use]
    pub fn status(&self, permission: Permission) -> PermissionStatus {
        self.host.check(permission)
    }

    /// Ask for `permission` through `prompt` unless it is already granted.
    ///
    /// Blocks while the prompt is shown. Returns the status re-queried from
    /// the host afterwards. Without a prompt the current status is returned
    /// unchanged.
    pub fn ensure<P>(
        &self,
        permission: Permission,
        prompt: Option<&P>,
        request_code: i32,
    ) -> PermissionStatus
    where
        P: PermissionPrompt + ?Sized,
    {
        let status = self.host.check(permission);
        if status.is_granted() {
            return status;
        }

        let Some(prompt) = prompt else {
            warn!("{permission} is {status:?} and no prompt is available");
            return status;
        };

        debug!("requesting {permission} (request code {request_code})");
        prompt.request_permission(permission, request_code);

        let status = self.host.check(permission);
        if !status.is_granted() {
            warn!("{permission} still {status:?} after prompt");
        }
        status
    }
}
