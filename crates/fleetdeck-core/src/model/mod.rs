//! Canonical domain types for the fleetdeck client.

pub mod machine;
pub mod power;

pub use machine::{ConnectMethod, MacAddress, Machine, MachineKind, RUNNING_STATUS};
pub use power::PowerOp;
