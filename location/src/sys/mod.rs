//! Host-independent provider implementations.
//!
//! Platform providers live with the host application and implement
//! [`LocationProvider`](crate::LocationProvider) directly. The simulated
//! provider here runs anywhere: desktop hosts, demos and tests.

mod simulated;

pub use simulated::{ProviderCall, SimulatedProvider};
