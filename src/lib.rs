//! # Thingkit
//!
//! Device location and catalog access for hosts that run a scripted
//! ThingEngine runtime.
//!
//! The kit exposes the device's location provider to scripts through an
//! asynchronous command/event bridge, and ships a small client for the remote
//! device catalog.
//!
//! ## Features
//!
//! - `permission`: Runtime permission model and the permission gatekeeper.
//! - `bridge`: Named async commands and push events for the scripting side.
//! - `location`: The location acquisition lifecycle manager and its `Gps` bridge module.
//! - `catalog`: Remote catalog client using the stored developer key.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! thingkit = { version = "0.1", features = ["location"] }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use thingkit::location::{LocationAcquisitionManager, LocationConfig};
//!
//! fn current(provider: Arc<dyn thingkit::location::LocationProvider>, host: Arc<dyn thingkit::permission::PermissionHost>) {
//!     let manager = LocationAcquisitionManager::new(provider, host, LocationConfig::default());
//!     if let Ok(Some(sample)) = manager.get_current_location() {
//!         println!("Latitude: {}, Longitude: {}", sample.latitude, sample.longitude);
//!     }
//! }
//! ```

#[cfg(feature = "bridge")]
pub use thingkit_bridge as bridge;

#[cfg(feature = "catalog")]
pub use thingkit_catalog as catalog;

#[cfg(feature = "location")]
pub use thingkit_location as location;

#[cfg(feature = "permission")]
pub use thingkit_permission as permission;
