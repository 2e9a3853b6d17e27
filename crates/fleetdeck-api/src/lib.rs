//! fleetdeck-api: Async HTTP client for the fleetdeck inventory backend.
//!
//! Wraps the backend's small REST surface — machine inventory CRUD and the
//! power endpoint — behind typed methods on [`InventoryClient`]. The one
//! protocol subtlety lives here: `POST /api/power` answers `401` to mean
//! "retry with a password", which this crate surfaces as
//! [`PowerOutcome::AuthRequired`] rather than an error, so callers can drive
//! the challenge flow with a plain `match`.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{InventoryClient, PowerOutcome};
pub use error::Error;
pub use models::{AddMachineRequest, MachineRecord};
pub use transport::TransportConfig;
