use thiserror::Error;

/// Top-level error type for the `fleetdeck-api` crate.
///
/// Covers every failure mode of the backend HTTP surface. Note that a `401`
/// from the power endpoint is NOT an error — it is the authentication
/// challenge, reported as [`crate::PowerOutcome::AuthRequired`].
/// `fleetdeck-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client-build error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Application-level rejection ─────────────────────────────────
    /// The backend rejected the request with a structured `{"error": ...}`
    /// body. The message is the backend's exact text.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Non-2xx response without a structured error body.
    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if no response reached the client at all
    /// (connection, DNS, or timeout failure).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
