use async_channel::{Receiver, Sender, unbounded};
use log::warn;
use serde_json::Value;

/// A push notification delivered to the scripting side.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeEvent {
    /// Module that emitted the event.
    pub module: String,
    /// Event name, e.g. `onlocationchanged`.
    pub event: String,
    /// Event payload. `Value::Null` marks an explicit absence.
    pub payload: Value,
}

/// Destination of module events.
///
/// `emit` must not block: it is called from host callback threads.
pub trait EventSink: Send + Sync {
    /// Deliver `event` from `module` with `payload`.
    fn emit(&self, module: &str, event: &str, payload: Value);
}

/// An [`EventSink`] that queues events on an unbounded FIFO channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: Sender<BridgeEvent>,
}

impl ChannelEventSink {
    /// Create a sink and the receiver the scripting side drains.
    #[must_use]
    pub fn new() -> (Self, Receiver<BridgeEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, module: &str, event: &str, payload: Value) {
        let event = BridgeEvent {
            module: module.to_owned(),
            event: event.to_owned(),
            payload,
        };
        if let Err(err) = self.sender.try_send(event) {
            warn!("dropping bridge event: {err}");
        }
    }
}
