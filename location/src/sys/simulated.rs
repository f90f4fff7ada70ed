use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use async_channel::{Sender, bounded, unbounded};
use log::{error, warn};
use thingkit_permission::{Permission, PermissionHost};

use crate::{
    LocationProvider, LocationSample, ProviderError, SampleCallback, SettingsStatus, UpdateProfile,
};

const NOT_CONNECTED: &str = "provider client is not connected yet";

/// A call received by a [`SimulatedProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// `connect`
    Connect,
    /// `disconnect`
    Disconnect,
    /// `check_settings`
    CheckSettings(UpdateProfile),
    /// `request_updates`
    RequestUpdates(UpdateProfile),
    /// `remove_updates`
    RemoveUpdates,
    /// `last_location`
    LastLocation,
}

enum Dispatch {
    Update(Option<LocationSample>),
    Flush(Sender<()>),
}

struct State {
    connected: bool,
    connect_error: Option<String>,
    connect_delay: Option<Duration>,
    settings: SettingsStatus,
    last_fix: Option<LocationSample>,
    last_location_error: Option<String>,
    permissions: Option<Arc<dyn PermissionHost>>,
    journal: Vec<ProviderCall>,
}

/// A scriptable location provider.
///
/// Behaves like a connection-oriented platform service: most calls fail
/// unless connected, updates pushed with [`push`](Self::push) are delivered
/// on the provider's own callback thread, and disconnecting drops the
/// registered callback. Every call is recorded in a journal.
pub struct SimulatedProvider {
    state: Mutex<State>,
    callback: Arc<Mutex<Option<SampleCallback>>>,
    dispatch: Sender<Dispatch>,
}

impl fmt::Debug for SimulatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SimulatedProvider")
            .field("connected", &state.connected)
            .field("settings", &state.settings)
            .field("last_fix", &state.last_fix)
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProvider {
    /// A provider that connects, has satisfied settings, and no cached fix.
    #[must_use]
    pub fn new() -> Self {
        let (dispatch, receiver) = unbounded::<Dispatch>();
        let callback: Arc<Mutex<Option<SampleCallback>>> = Arc::new(Mutex::new(None));

        let slot = callback.clone();
        let spawned = thread::Builder::new()
            .name("simulated-location-callbacks".into())
            .spawn(move || {
                while let Ok(dispatch) = receiver.recv_blocking() {
                    match dispatch {
                        Dispatch::Update(sample) => {
                            let callback = slot
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .clone();
                            if let Some(callback) = callback {
                                callback(sample);
                            }
                        }
                        Dispatch::Flush(done) => {
                            let _ = done.try_send(());
                        }
                    }
                }
            });
        if let Err(err) = spawned {
            error!("failed to spawn simulated callback thread: {err}");
        }

        Self {
            state: Mutex::new(State {
                connected: false,
                connect_error: None,
                connect_delay: None,
                settings: SettingsStatus::Satisfied,
                last_fix: None,
                last_location_error: None,
                permissions: None,
                journal: Vec::new(),
            }),
            callback,
            dispatch,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn callback_slot(&self) -> MutexGuard<'_, Option<SampleCallback>> {
        self.callback.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `connect` fail with `message`, or succeed again with `None`.
    pub fn fail_connect(&self, message: Option<&str>) {
        self.lock().connect_error = message.map(str::to_owned);
    }

    /// Make `connect` take `delay` before answering.
    pub fn set_connect_delay(&self, delay: Option<Duration>) {
        self.lock().connect_delay = delay;
    }

    /// Set the answer to settings checks.
    pub fn set_settings(&self, status: SettingsStatus) {
        self.lock().settings = status;
    }

    /// Set the cached fix.
    pub fn set_last_fix(&self, sample: Option<LocationSample>) {
        self.lock().last_fix = sample;
    }

    /// Make `last_location` fail with `message`, or succeed again with `None`.
    pub fn fail_last_location(&self, message: Option<&str>) {
        self.lock().last_location_error = message.map(str::to_owned);
    }

    /// Refuse registrations and fix reads unless `host` grants the fine
    /// location permission.
    pub fn enforce_permission(&self, host: Arc<dyn PermissionHost>) {
        self.lock().permissions = Some(host);
    }

    /// Deliver an update to the registered callback on the callback thread.
    /// A fix also becomes the cached fix.
    pub fn push(&self, sample: Option<LocationSample>) {
        if sample.is_some() {
            self.lock().last_fix.clone_from(&sample);
        }
        if let Err(err) = self.dispatch.try_send(Dispatch::Update(sample)) {
            warn!("simulated provider dropped an update: {err}");
        }
    }

    /// Block until every update pushed so far has been delivered.
    pub fn flush(&self) {
        let (done, wait) = bounded(1);
        if self.dispatch.try_send(Dispatch::Flush(done)).is_ok() {
            let _ = wait.recv_blocking();
        }
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<ProviderCall> {
        self.lock().journal.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// Whether a callback is registered.
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.callback_slot().is_some()
    }

    /// Whether the provider is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn record(&self, call: ProviderCall) -> MutexGuard<'_, State> {
        let mut state = self.lock();
        state.journal.push(call);
        state
    }

    fn check_access(state: &State) -> Result<(), ProviderError> {
        if !state.connected {
            return Err(ProviderError::new(NOT_CONNECTED));
        }
        match &state.permissions {
            Some(host) if !host.check(Permission::FineLocation).is_granted() => Err(
                ProviderError::new("Client must have ACCESS_FINE_LOCATION permission"),
            ),
            _ => Ok(()),
        }
    }
}

impl LocationProvider for SimulatedProvider {
    fn connect(&self) -> Result<(), ProviderError> {
        let (delay, failure) = {
            let state = self.record(ProviderCall::Connect);
            (state.connect_delay, state.connect_error.clone())
        };

        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        if let Some(message) = failure {
            return Err(ProviderError::new(message));
        }

        self.lock().connected = true;
        Ok(())
    }

    fn disconnect(&self) {
        self.record(ProviderCall::Disconnect).connected = false;
        *self.callback_slot() = None;
    }

    fn check_settings(&self, profile: &UpdateProfile) -> Result<SettingsStatus, ProviderError> {
        let state = self.record(ProviderCall::CheckSettings(*profile));
        if !state.connected {
            return Err(ProviderError::new(NOT_CONNECTED));
        }
        Ok(state.settings.clone())
    }

    fn request_updates(
        &self,
        profile: &UpdateProfile,
        callback: SampleCallback,
    ) -> Result<(), ProviderError> {
        {
            let state = self.record(ProviderCall::RequestUpdates(*profile));
            Self::check_access(&state)?;
        }
        *self.callback_slot() = Some(callback);
        Ok(())
    }

    fn remove_updates(&self) -> Result<(), ProviderError> {
        {
            let state = self.record(ProviderCall::RemoveUpdates);
            if !state.connected {
                return Err(ProviderError::new(NOT_CONNECTED));
            }
        }
        *self.callback_slot() = None;
        Ok(())
    }

    fn last_location(&self) -> Result<Option<LocationSample>, ProviderError> {
        let state = self.record(ProviderCall::LastLocation);
        Self::check_access(&state)?;
        if let Some(message) = &state.last_location_error {
            return Err(ProviderError::new(message.clone()));
        }
        Ok(state.last_fix.clone())
    }
}
