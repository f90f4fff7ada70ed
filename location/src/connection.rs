use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::blocking::wait_bounded;
use crate::{
    LocationError, LocationProvider, LocationResult, LocationSample, SampleCallback,
    SettingsStatus, UpdateProfile, ValidatedRequest,
};

const NOT_CONNECTED: &str = "location provider is not connected";
const CONNECT_FAILED: &str = "Failed to connect to location provider";

/// Lifecycle of the provider connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No connection.
    Disconnected,
    /// A connect attempt is in progress.
    Connecting,
    /// Connected and usable.
    Connected,
    /// The last connect attempt failed or timed out.
    Failed,
}

/// Identifies the live update registration with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Progress of a connect call running on a helper thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Pending,
    // the caller stopped waiting; a late success is undone by the helper
    Abandoned,
    Settled { connected: bool },
}

fn lock_attempt(attempt: &Mutex<Attempt>) -> MutexGuard<'_, Attempt> {
    attempt.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Inner {
    state: ConnectionState,
    subscription: Option<SubscriptionHandle>,
    abandoned: Option<Arc<Mutex<Attempt>>>,
}

/// Owns the provider connection and its single update subscription.
///
/// `connect`, `disconnect`, `subscribe` and `unsubscribe` are serialized
/// against each other. Provider callbacks from a replaced or removed
/// subscription are discarded, and once `unsubscribe` or `disconnect`
/// returns the removed callback has finished delivering.
///
/// A connect that times out is not left behind: if the provider connects
/// after the deadline, it is disconnected again.
pub struct ConnectionManager {
    provider: Arc<dyn LocationProvider>,
    inner: Mutex<Inner>,
    // id of the live subscription, 0 when there is none; deliveries hold the
    // read lock
    live: Arc<RwLock<u64>>,
    next_handle: AtomicU64,
    connect_timeout: Option<Duration>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("inner", &*self.lock())
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl ConnectionManager {
    /// Create a manager for `provider`. Connecting gives up after
    /// `connect_timeout`, or never with `None`.
    #[must_use]
    pub fn new(provider: Arc<dyn LocationProvider>, connect_timeout: Option<Duration>) -> Self {
        Self {
            provider,
            inner: Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                subscription: None,
                abandoned: None,
            }),
            live: Arc::new(RwLock::new(0)),
            next_handle: AtomicU64::new(1),
            connect_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // waits for deliveries in progress
    fn set_live(&self, id: u64) {
        *self.live.write().unwrap_or_else(PoisonError::into_inner) = id;
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// The live subscription, if any.
    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionHandle> {
        self.lock().subscription
    }

    /// Connect to the provider. Does nothing when already connected.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Connection`] with the provider's diagnostic
    /// when the attempt fails or times out, or while an earlier timed-out
    /// attempt is still running.
    pub fn connect(&self) -> LocationResult<()> {
        let mut inner = self.lock();
        if inner.state == ConnectionState::Connected {
            return Ok(());
        }

        if let Some(previous) = inner.abandoned.take() {
            if *lock_attempt(&previous) == Attempt::Abandoned {
                inner.abandoned = Some(previous);
                inner.state = ConnectionState::Failed;
                return Err(LocationError::Connection(format!(
                    "{CONNECT_FAILED}: previous attempt still pending"
                )));
            }
        }

        inner.state = ConnectionState::Connecting;
        debug!("connecting to location provider");

        let attempt = Arc::new(Mutex::new(Attempt::Pending));
        let slot = attempt.clone();
        let provider = self.provider.clone();
        let outcome = wait_bounded(self.connect_timeout, move || {
            let result = provider.connect();
            let mut attempt = lock_attempt(&slot);
            if *attempt == Attempt::Abandoned && result.is_ok() {
                warn!("location provider connected after the deadline; disconnecting");
                provider.disconnect();
            }
            *attempt = Attempt::Settled {
                connected: result.is_ok(),
            };
            result
        });

        match outcome {
            Some(Ok(())) => {
                inner.state = ConnectionState::Connected;
                debug!("location provider connected");
                Ok(())
            }
            Some(Err(err)) => {
                inner.state = ConnectionState::Failed;
                Err(LocationError::Connection(format!("{CONNECT_FAILED}: {err}")))
            }
            None => {
                inner.state = ConnectionState::Failed;
                let settled = {
                    let mut state = lock_attempt(&attempt);
                    match *state {
                        Attempt::Settled { connected } => Some(connected),
                        Attempt::Pending | Attempt::Abandoned => {
                            *state = Attempt::Abandoned;
                            None
                        }
                    }
                };
                match settled {
                    // answered between the deadline and now
                    Some(true) => self.provider.disconnect(),
                    Some(false) => {}
                    None => inner.abandoned = Some(attempt),
                }

                let waited = self.connect_timeout.unwrap_or_default();
                Err(LocationError::Connection(format!(
                    "{CONNECT_FAILED}: no answer after {} ms",
                    waited.as_millis()
                )))
            }
        }
    }

    /// Register `on_sample` for updates under `request`, replacing any live
    /// subscription.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Connection`] when not connected or when the
    /// provider refuses the registration.
    pub fn subscribe(
        &self,
        request: &ValidatedRequest,
        on_sample: SampleCallback,
    ) -> LocationResult<SubscriptionHandle> {
        let mut inner = self.lock();
        if inner.state != ConnectionState::Connected {
            return Err(LocationError::Connection(NOT_CONNECTED.into()));
        }

        if let Some(previous) = inner.subscription.take() {
            debug!("replacing location subscription {previous:?}");
            self.remove_updates();
        }

        let handle = SubscriptionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let live = self.live.clone();
        let callback: SampleCallback = Arc::new(move |sample: Option<LocationSample>| {
            let live = live.read().unwrap_or_else(PoisonError::into_inner);
            if *live == handle.0 {
                on_sample(sample);
            }
        });

        self.set_live(handle.0);
        if let Err(err) = self.provider.request_updates(request.profile(), callback) {
            self.set_live(0);
            return Err(LocationError::Connection(err.message));
        }

        inner.subscription = Some(handle);
        info!("location updates started ({handle:?})");
        Ok(handle)
    }

    /// Remove the registration behind `handle`. Does nothing if it is no
    /// longer live.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut inner = self.lock();
        if inner.subscription != Some(handle) {
            return;
        }

        inner.subscription = None;
        self.remove_updates();
        info!("location updates stopped ({handle:?})");
    }

    /// Disconnect from the provider, dropping any subscription. Does nothing
    /// when not connected.
    pub fn disconnect(&self) {
        let mut inner = self.lock();
        if inner.state != ConnectionState::Connected {
            return;
        }

        if let Some(handle) = inner.subscription.take() {
            self.remove_updates();
            info!("location updates stopped ({handle:?})");
        }
        self.provider.disconnect();
        inner.state = ConnectionState::Disconnected;
        debug!("location provider disconnected");
    }

    /// The provider's cached fix, if it has one.
    ///
    /// Provider failures are logged and reported as no fix.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Connection`] when not connected.
    pub fn last_known(&self) -> LocationResult<Option<LocationSample>> {
        self.ensure_connected()?;

        match self.provider.last_location() {
            Ok(sample) => Ok(sample),
            Err(err) => {
                warn!("failed to read last known location: {err}");
                Ok(None)
            }
        }
    }

    /// Ask the provider whether host settings satisfy `profile`.
    ///
    /// The lock is not held while the provider answers. `Ok(None)` means no
    /// answer arrived within `timeout`.
    pub(crate) fn check_settings(
        &self,
        profile: &UpdateProfile,
        timeout: Option<Duration>,
    ) -> LocationResult<Option<SettingsStatus>> {
        self.ensure_connected()?;

        let provider = self.provider.clone();
        let profile = *profile;
        match wait_bounded(timeout, move || provider.check_settings(&profile)) {
            Some(Ok(status)) => Ok(Some(status)),
            Some(Err(err)) => Err(LocationError::Connection(err.message)),
            None => Ok(None),
        }
    }

    fn ensure_connected(&self) -> LocationResult<()> {
        if self.state() == ConnectionState::Connected {
            Ok(())
        } else {
            Err(LocationError::Connection(NOT_CONNECTED.into()))
        }
    }

    // caller holds the lock
    fn remove_updates(&self) {
        self.set_live(0);
        if let Err(err) = self.provider.remove_updates() {
            error!("failed to remove location updates: {err}");
        }
    }
}
