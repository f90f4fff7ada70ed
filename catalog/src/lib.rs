//! Client for the remote catalog of device classes and command examples.
//!
//! Requests carry the developer key stored in the user's [`Preferences`],
//! when one is set.

mod client;
mod error;
mod preferences;

pub use client::{CatalogClient, DEFAULT_BASE_URL};
pub use error::{CatalogError, CatalogResult};
pub use preferences::{DEVELOPER_KEY, Preferences};
