//! Reactive data layer between `fleetdeck-api` and UI consumers (CLI / TUI).
//!
//! This crate owns the business logic, domain model, and dispatch
//! infrastructure for the fleetdeck workspace:
//!
//! - **[`Controller`]** — Central facade managing the full lifecycle:
//!   [`connect()`](Controller::connect) performs the initial inventory
//!   fetch, then spawns the poller and command processor.
//!   [`Controller::oneshot()`](Controller::oneshot) provides a lightweight
//!   fire-and-forget mode for single CLI invocations.
//!
//! - **The two-phase power protocol** — [`Controller::begin_power`] issues
//!   the optimistic unauthenticated attempt; a 401 surfaces as
//!   [`PowerProgress::Challenge`], the operator's credential replays via
//!   [`Controller::resume_power`]. Pending actions carry a generation
//!   token so a superseded action's late response is dropped, never
//!   misattributed.
//!
//! - **[`MachineStore`]** — Reactive storage (`DashMap` + `tokio::sync::watch`)
//!   replaced wholesale on every successful poll; subscribers receive
//!   ordered snapshots through [`EntityStream`].
//!
//! - **[`view`]** — Pure projection from the machine snapshot to cards and
//!   aggregate counters, shared by both rendering surfaces.
//!
//! - **Domain model** ([`model`]) — `Machine`, `MacAddress`, `PowerOp`,
//!   `ConnectMethod`, `MachineKind`.

pub mod command;
pub mod config;
pub mod connect;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{AddMachineRequest, Command, CommandResult};
pub use config::ControllerConfig;
pub use connect::{ConnectTarget, connect_target};
pub use controller::{ConnectionState, Controller, PendingPower, PowerProgress};
pub use error::CoreError;
pub use store::MachineStore;
pub use stream::EntityStream;
pub use view::{CardAction, FleetSummary, FleetView, MachineCard, project_fleet};

// Re-export model types at the crate root for ergonomics.
pub use model::{ConnectMethod, MacAddress, Machine, MachineKind, PowerOp, RUNNING_STATUS};
