use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_channel::Receiver;
use log::{debug, warn};
use thingkit_permission::{Gatekeeper, Permission, PermissionHost};

use crate::blocking::wait_bounded;
use crate::events::{EventQueue, report};
use crate::{
    ConnectionManager, ConnectionState, InteractionCallback, LocationConfig, LocationEvent,
    LocationProvider, LocationResult, LocationSample, REQUEST_GPS, SampleCallback,
    SettingsNegotiator, UpdateProfile,
};

/// Orchestrates connection, permission, settings negotiation and the update
/// subscription.
///
/// Commands may be called concurrently from several threads. Events produced
/// by `start` are read from [`events`](Self::events). Dropping the manager
/// stops it.
pub struct LocationAcquisitionManager {
    connection: ConnectionManager,
    negotiator: SettingsNegotiator,
    gatekeeper: Gatekeeper,
    interaction: RwLock<Option<Arc<dyn InteractionCallback>>>,
    profile: UpdateProfile,
    permission_timeout: Option<Duration>,
    events: EventQueue,
}

impl fmt::Debug for LocationAcquisitionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationAcquisitionManager")
            .field("connection", &self.connection)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl LocationAcquisitionManager {
    /// Create a manager for `provider`, checking permissions against `host`.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LocationProvider>,
        host: Arc<dyn PermissionHost>,
        config: LocationConfig,
    ) -> Self {
        Self {
            connection: ConnectionManager::new(provider, config.timeouts.connect()),
            negotiator: SettingsNegotiator::new(config.timeouts.settings()),
            gatekeeper: Gatekeeper::new(host),
            interaction: RwLock::new(None),
            profile: config.profile,
            permission_timeout: config.timeouts.permission(),
            events: EventQueue::new(),
        }
    }

    /// Attach or detach the UI collaborator. It is looked up afresh on every
    /// command.
    pub fn set_interaction(&self, interaction: Option<Arc<dyn InteractionCallback>>) {
        *self
            .interaction
            .write()
            .unwrap_or_else(PoisonError::into_inner) = interaction;
    }

    fn interaction(&self) -> Option<Arc<dyn InteractionCallback>> {
        self.interaction
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receiver of `onlocationchanged` events, in delivery order.
    #[must_use]
    pub fn events(&self) -> Receiver<LocationEvent> {
        self.events.receiver()
    }

    /// Current state of the provider connection.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Whether location updates are currently subscribed.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.connection.subscription().is_some()
    }

    /// Start streaming location updates.
    ///
    /// On success one event carrying the provider's cached fix (or an
    /// explicit absence) is queued right away. Calling `start` again replaces
    /// the running subscription.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Connection`](crate::LocationError::Connection)
    /// if the provider cannot be reached, and
    /// [`LocationError::SettingsDenied`](crate::LocationError::SettingsDenied)
    /// if the host settings are insufficient. After a settings denial the
    /// connection stays open without a subscription.
    pub fn start(&self) -> LocationResult<()> {
        self.connection.connect()?;

        let interaction = self.interaction();
        self.ensure_permission(interaction.clone());
        let request = self
            .negotiator
            .negotiate(&self.connection, &self.profile, interaction)?;

        let sender = self.events.sender();
        let callback: SampleCallback =
            Arc::new(move |sample: Option<LocationSample>| report(&sender, sample.as_ref()));
        self.connection.subscribe(&request, callback)?;

        let last = self.connection.last_known()?;
        report(&self.events.sender(), last.as_ref());
        Ok(())
    }

    /// Stop streaming and disconnect. Does nothing when not connected.
    ///
    /// An update being delivered when `stop` is called finishes first; no
    /// event is queued after `stop` returns.
    pub fn stop(&self) {
        if self.connection.state() != ConnectionState::Connected {
            debug!("stop requested while not connected");
            return;
        }

        if let Some(handle) = self.connection.subscription() {
            self.connection.unsubscribe(handle);
        }
        self.connection.disconnect();
    }

    /// Fetch the provider's current fix without subscribing to updates.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start). A concurrent [`stop`](Self::stop) may
    /// make this fail with a connection error.
    pub fn get_current_location(&self) -> LocationResult<Option<LocationSample>> {
        self.connection.connect()?;

        let interaction = self.interaction();
        self.ensure_permission(interaction.clone());
        self.negotiator
            .negotiate(&self.connection, &self.profile, interaction)?;

        self.connection.last_known()
    }

    // Soft: a missing grant surfaces later as a provider error.
    fn ensure_permission(&self, interaction: Option<Arc<dyn InteractionCallback>>) {
        let gatekeeper = self.gatekeeper.clone();
        let status = wait_bounded(self.permission_timeout, move || {
            gatekeeper.ensure(Permission::FineLocation, interaction.as_deref(), REQUEST_GPS)
        });

        match status {
            Some(status) if status.is_granted() => {}
            Some(status) => debug!("continuing without location permission ({status:?})"),
            None => warn!("location permission request timed out; continuing"),
        }
    }
}

impl Drop for LocationAcquisitionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
