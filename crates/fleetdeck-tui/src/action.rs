//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use fleetdeck_core::{MacAddress, Machine, PowerOp, PowerProgress};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Pending confirmation action.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteMachine { identity: MacAddress, name: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteMachine { name, .. } => {
                write!(f, "Delete {name}? This cannot be undone.")
            }
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Data Events (from the controller stream) ───────────────────
    MachinesUpdated(Arc<Vec<Arc<Machine>>>),

    // ── Connection Status ─────────────────────────────────────────
    Connecting,
    Connected,
    Disconnected(String),

    // ── Card Selection ────────────────────────────────────────────
    SelectNext,
    SelectPrev,
    SelectUp,
    SelectDown,

    // ── Dispatch intents ──────────────────────────────────────────
    RequestPower {
        identity: MacAddress,
        operation: PowerOp,
    },
    RequestDelete {
        identity: MacAddress,
    },
    RequestConnect {
        identity: MacAddress,
    },

    // ── Power protocol flow ───────────────────────────────────────
    /// One protocol step resolved (from a spawned dispatch task).
    PowerProgressed(PowerProgress),
    /// Terminal failure; the message is already user-facing.
    PowerFailed(String),
    /// Password modal submit / cancel.
    SubmitPassword,
    CancelPassword,

    // ── Add-machine modal ─────────────────────────────────────────
    OpenAddModal,
    CloseAddModal,
    SubmitAdd,
    AddSucceeded,
    AddFailed(String),

    // ── Confirm Dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
