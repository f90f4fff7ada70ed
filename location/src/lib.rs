//! Location acquisition lifecycle.
//!
//! This crate connects to a host location provider, checks that the host's
//! location settings can serve the requested update profile, asks for the
//! location permission when it is missing, and streams location fixes.
//!
//! The pieces, leaves first:
//!
//! - [`SettingsNegotiator`] checks the provider settings and lets the user
//!   fix them through an [`InteractionCallback`].
//! - [`Gatekeeper`](thingkit_permission::Gatekeeper) asks for the fine
//!   location permission when it is missing.
//! - [`ConnectionManager`] owns the provider connection and the single
//!   update subscription.
//! - [`LocationAcquisitionManager`] composes the three into `start`, `stop`
//!   and `get_current_location`.
//! - [`GpsApi`] exposes the manager to scripts as the `Gps` bridge module.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use thingkit_location::{LocationAcquisitionManager, LocationConfig};
//! use thingkit_location::sys::SimulatedProvider;
//! use thingkit_permission::{GrantTable, Permission};
//!
//! let provider = Arc::new(SimulatedProvider::new());
//! let grants = Arc::new(GrantTable::granting([Permission::FineLocation]));
//! let manager = LocationAcquisitionManager::new(provider, grants, LocationConfig::default());
//!
//! manager.start()?;
//! while let Ok(event) = manager.events().recv_blocking() {
//!     println!("{}: {}", event.name(), event.payload());
//! }
//! ```

#![warn(missing_docs)]

mod api;
mod blocking;
mod config;
mod connection;
mod error;
mod events;
mod interaction;
mod manager;
mod negotiator;
mod profile;
mod provider;
mod sample;

/// Host-independent provider implementations.
pub mod sys;

pub use api::{GpsApi, MODULE};
pub use config::{LocationConfig, Timeouts};
pub use connection::{ConnectionManager, ConnectionState, SubscriptionHandle};
pub use error::{LocationError, LocationResult};
pub use events::LocationEvent;
pub use interaction::{ENABLE_GPS, InteractionCallback, REQUEST_GPS};
pub use manager::LocationAcquisitionManager;
pub use negotiator::{SettingsNegotiator, ValidatedRequest};
pub use profile::{Priority, UpdateProfile};
pub use provider::{
    LocationProvider, ProviderError, ResolutionToken, SampleCallback, SettingsStatus,
};
pub use sample::LocationSample;

pub use thingkit_permission::{Permission, PermissionStatus};
