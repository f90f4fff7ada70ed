use async_channel::{Receiver, Sender, bounded};
use log::{error, warn};
use serde_json::Value;

use crate::LocationSample;

const MAX_QUEUED_EVENTS: usize = 256;

/// A push notification produced by the location manager.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// A new fix, as a bridge record, or `None` when the update carried no
    /// usable fix.
    LocationChanged(Option<Value>),
}

impl LocationEvent {
    /// Event name on the bridge.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocationChanged(_) => "onlocationchanged",
        }
    }

    /// Event payload; `Value::Null` marks an explicit absence.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::LocationChanged(record) => record.clone().unwrap_or(Value::Null),
        }
    }
}

/// FIFO queue between provider callbacks and whoever forwards the events.
///
/// Pushing never blocks; when the queue is full the newest event is dropped.
#[derive(Debug)]
pub(crate) struct EventQueue {
    sender: Sender<LocationEvent>,
    receiver: Receiver<LocationEvent>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = bounded(MAX_QUEUED_EVENTS);
        Self { sender, receiver }
    }

    pub(crate) fn sender(&self) -> Sender<LocationEvent> {
        self.sender.clone()
    }

    pub(crate) fn receiver(&self) -> Receiver<LocationEvent> {
        self.receiver.clone()
    }
}

/// Queue a location-changed event for `sample`.
///
/// A sample that cannot be serialized is logged and reported as absent.
pub(crate) fn report(sender: &Sender<LocationEvent>, sample: Option<&LocationSample>) {
    let record = match sample.map(LocationSample::to_record).transpose() {
        Ok(record) => record,
        Err(err) => {
            error!("{err}");
            None
        }
    };

    if let Err(err) = sender.try_send(LocationEvent::LocationChanged(record)) {
        warn!("dropping location event: {err}");
    }
}
