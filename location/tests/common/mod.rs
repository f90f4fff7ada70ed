#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use thingkit_location::sys::SimulatedProvider;
use thingkit_location::{
    InteractionCallback, LocationAcquisitionManager, LocationConfig, LocationSample,
    ResolutionToken,
};
use thingkit_permission::{GrantTable, Permission, PermissionHost, PermissionPrompt, PermissionStatus};

pub fn fused_fix() -> LocationSample {
    LocationSample {
        latitude: 37.42,
        longitude: -122.08,
        altitude: 10.0,
        bearing: 0.0,
        provider: "fused".into(),
        speed_mps: 0.0,
        timestamp_ms: 1000,
    }
}

pub fn fix_at(timestamp_ms: i64) -> LocationSample {
    LocationSample {
        timestamp_ms,
        ..fused_fix()
    }
}

/// Scripted UI collaborator.
pub struct Ui {
    pub resolve: bool,
    pub grant_on_prompt: bool,
    pub grants: Arc<GrantTable>,
    pub resolutions: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<(Permission, i32)>>,
    pub on_resolve: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
}

impl Ui {
    pub fn new(grants: Arc<GrantTable>, resolve: bool, grant_on_prompt: bool) -> Arc<Self> {
        Arc::new(Self {
            resolve,
            grant_on_prompt,
            grants,
            resolutions: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            on_resolve: Mutex::new(None),
        })
    }
}

impl PermissionPrompt for Ui {
    fn request_permission(&self, permission: Permission, request_code: i32) {
        self.prompts.lock().unwrap().push((permission, request_code));
        if self.grant_on_prompt {
            self.grants.grant(permission);
        } else {
            self.grants.deny(permission);
        }
    }
}

impl InteractionCallback for Ui {
    fn resolve_settings(&self, token: &ResolutionToken, _request_code: i32) -> bool {
        self.resolutions.lock().unwrap().push(token.as_str().to_owned());
        if let Some(hook) = self.on_resolve.lock().unwrap().as_ref() {
            hook();
        }
        self.resolve
    }
}

/// Permission host that counts queries.
pub struct CountingHost {
    pub inner: GrantTable,
    pub checks: AtomicUsize,
}

impl CountingHost {
    pub fn granted() -> Arc<Self> {
        Arc::new(Self {
            inner: GrantTable::granting([Permission::FineLocation]),
            checks: AtomicUsize::new(0),
        })
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl PermissionHost for CountingHost {
    fn check(&self, permission: Permission) -> PermissionStatus {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.check(permission)
    }
}

pub struct Fixture {
    pub provider: Arc<SimulatedProvider>,
    pub grants: Arc<GrantTable>,
    pub manager: Arc<LocationAcquisitionManager>,
}

/// Connected-capable provider, granted permission, satisfied settings.
pub fn fixture() -> Fixture {
    let provider = Arc::new(SimulatedProvider::new());
    let grants = Arc::new(GrantTable::granting([Permission::FineLocation]));
    let manager = Arc::new(LocationAcquisitionManager::new(
        provider.clone(),
        grants.clone(),
        LocationConfig::default(),
    ));
    Fixture {
        provider,
        grants,
        manager,
    }
}
