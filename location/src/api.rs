use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;
use serde_json::Value;
use thingkit_bridge::{ApiModule, CommandBridge, EventSink};

use crate::{LocationAcquisitionManager, LocationError};

/// Bridge module name.
pub const MODULE: &str = "Gps";

/// Exposes a [`LocationAcquisitionManager`] to scripts as the `Gps` module.
///
/// Commands: `start`, `stop`, `getCurrentLocation`. Event:
/// `onlocationchanged`.
#[derive(Clone)]
pub struct GpsApi {
    manager: Arc<LocationAcquisitionManager>,
}

impl fmt::Debug for GpsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpsApi").finish_non_exhaustive()
    }
}

impl GpsApi {
    /// Wrap `manager`.
    #[must_use]
    pub const fn new(manager: Arc<LocationAcquisitionManager>) -> Self {
        Self { manager }
    }

    /// The wrapped manager.
    #[must_use]
    pub const fn manager(&self) -> &Arc<LocationAcquisitionManager> {
        &self.manager
    }

    /// Forward the manager's events to `sink` on a dedicated thread, in
    /// order. The thread ends once the manager is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn forward_events(&self, sink: Arc<dyn EventSink>) -> io::Result<JoinHandle<()>> {
        let receiver = self.manager.events();
        thread::Builder::new()
            .name("gps-events".into())
            .spawn(move || {
                while let Ok(event) = receiver.recv_blocking() {
                    sink.emit(MODULE, event.name(), event.payload());
                }
                debug!("gps event forwarding finished");
            })
    }
}

impl ApiModule for GpsApi {
    fn name(&self) -> &'static str {
        MODULE
    }

    fn register(&self, bridge: &CommandBridge) {
        let manager = self.manager.clone();
        bridge.register_async(MODULE, "start", move |_| manager.start());

        let manager = self.manager.clone();
        bridge.register_async(MODULE, "stop", move |_| {
            manager.stop();
            Ok::<_, LocationError>(())
        });

        let manager = self.manager.clone();
        bridge.register_async(
            MODULE,
            "getCurrentLocation",
            move |_| -> Result<Option<Value>, LocationError> {
                manager
                    .get_current_location()?
                    .map(|sample| sample.to_record())
                    .transpose()
            },
        );
    }
}
