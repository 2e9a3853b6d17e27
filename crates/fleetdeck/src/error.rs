//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fleetdeck_core::CoreError;

/// Exit codes for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(fleetdeck::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Network error: {reason}")]
    #[diagnostic(code(fleetdeck::network))]
    Network { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The backend requires a password for this operation")]
    #[diagnostic(
        code(fleetdeck::auth_required),
        help(
            "Re-run interactively to be prompted, or pipe the password:\n\
             echo <password> | fleetdeck power {operation} {machine} --password-stdin"
        )
    )]
    AuthRequired { operation: String, machine: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Machine '{identifier}' not found")]
    #[diagnostic(
        code(fleetdeck::not_found),
        help("Run: fleetdeck list to see known machines")
    )]
    MachineNotFound { identifier: String },

    #[error("Machine name '{name}' is ambiguous ({count} matches)")]
    #[diagnostic(
        code(fleetdeck::ambiguous),
        help("Display names are not unique keys — address the machine by MAC instead")
    )]
    AmbiguousMachine { name: String, count: usize },

    // ── Backend rejection ────────────────────────────────────────────
    /// The backend's own error text, surfaced verbatim.
    #[error("{message}")]
    #[diagnostic(code(fleetdeck::backend))]
    Backend { message: String },

    #[error("{message}")]
    #[diagnostic(code(fleetdeck::operation_failed))]
    OperationFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No backend configured")]
    #[diagnostic(
        code(fleetdeck::no_config),
        help(
            "Pass --backend <url>, set FLEETDECK_BACKEND, or create a profile:\n\
             fleetdeck config init --backend http://homeserver:5000\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fleetdeck::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(fleetdeck::config))]
    Config(#[from] fleetdeck_config::ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation cancelled")]
    #[diagnostic(code(fleetdeck::cancelled))]
    Cancelled,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(fleetdeck::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Network { .. } => exit_code::CONNECTION,
            Self::AuthRequired { .. } => exit_code::AUTH,
            Self::MachineNotFound { .. } => exit_code::NOT_FOUND,
            Self::AmbiguousMachine { .. } | Self::Validation { .. } | Self::Cancelled => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::NetworkFailure { reason } => CliError::Network { reason },
            CoreError::ControllerShutdown => CliError::Internal("controller shut down".into()),
            CoreError::MachineNotFound { identifier } => {
                CliError::MachineNotFound { identifier }
            }
            CoreError::AmbiguousMachine { name, count } => {
                CliError::AmbiguousMachine { name, count }
            }
            CoreError::Backend { message } => CliError::Backend { message },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::OperationFailed { message } => CliError::OperationFailed { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
