//! Command and event bridge to a scripting runtime.
//!
//! Native modules register named commands on a [`CommandBridge`]. The
//! scripting side invokes them by `module.command` with JSON arguments and
//! awaits a JSON result. Every invocation runs on its own worker thread, so a
//! command may block on host APIs without stalling other commands or the
//! caller's executor.
//!
//! Modules push unsolicited notifications through an [`EventSink`].
//!
//! # Usage
//!
//! ```ignore
//! use thingkit_bridge::CommandBridge;
//!
//! let bridge = CommandBridge::new();
//! bridge.register_async("Echo", "say", |args| Ok::<_, std::io::Error>(args));
//!
//! let result = bridge.invoke("Echo", "say", vec!["hi".into()]).await?;
//! assert_eq!(result, serde_json::json!(["hi"]));
//! ```

#![warn(missing_docs)]

mod command;
mod error;
mod event;

pub use command::{ApiModule, CommandBridge};
pub use error::BridgeError;
pub use event::{BridgeEvent, ChannelEventSink, EventSink};
