// ── Core error types ──
//
// User-facing errors from fleetdeck-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<fleetdeck_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.
// The one place the backend's own words survive is `Backend` — the power
// protocol surfaces its error text verbatim.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// Generic network failure (no response reached the client).
    #[error("Network error: {reason}")]
    NetworkFailure { reason: String },

    #[error("Controller is shut down")]
    ControllerShutdown,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Machine not found: {identifier}")]
    MachineNotFound { identifier: String },

    #[error("Machine name '{name}' is ambiguous ({count} matches) — use the MAC address")]
    AmbiguousMachine { name: String, count: usize },

    // ── Operation errors ─────────────────────────────────────────────
    /// The backend rejected the operation; `message` is its exact text.
    #[error("{message}")]
    Backend { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fleetdeck_api::Error> for CoreError {
    fn from(err: fleetdeck_api::Error) -> Self {
        match err {
            fleetdeck_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::NetworkFailure {
                        reason: e.to_string(),
                    }
                }
            }
            fleetdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fleetdeck_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fleetdeck_api::Error::Rejected { message, .. } => CoreError::Backend { message },
            fleetdeck_api::Error::Api { status, message } => CoreError::OperationFailed {
                message: format!("backend returned HTTP {status}: {message}"),
            },
            fleetdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
