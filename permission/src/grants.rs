use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{Permission, PermissionHost, PermissionStatus};

/// A host-independent table of permission grants.
///
/// Hosts without a runtime permission system (desktop, simulators) use this
/// as their [`PermissionHost`]. Permissions never touched report
/// [`PermissionStatus::Unknown`].
#[derive(Debug, Default)]
pub struct GrantTable {
    grants: Mutex<HashMap<Permission, PermissionStatus>>,
}

impl GrantTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table that already grants each of `permissions`.
    #[must_use]
    pub fn granting(permissions: impl IntoIterator<Item = Permission>) -> Self {
        let table = Self::new();
        for permission in permissions {
            table.grant(permission);
        }
        table
    }

    /// Record `permission` as granted.
    pub fn grant(&self, permission: Permission) {
        self.set(permission, PermissionStatus::Granted);
    }

    /// Record `permission` as denied.
    pub fn deny(&self, permission: Permission) {
        self.set(permission, PermissionStatus::Denied);
    }

    /// Record an arbitrary status for `permission`.
    pub fn set(&self, permission: Permission, status: PermissionStatus) {
        self.grants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(permission, status);
    }
}

impl PermissionHost for GrantTable {
    fn check(&self, permission: Permission) -> PermissionStatus {
        self.grants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&permission)
            .copied()
            .unwrap_or(PermissionStatus::Unknown)
    }
}
