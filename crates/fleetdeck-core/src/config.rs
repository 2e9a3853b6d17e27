// ── Runtime connection configuration ──
//
// Describes *how* to reach the inventory backend. Built by the CLI/TUI
// (from config files and flags) and handed to `Controller` — core never
// touches disk.

use std::time::Duration;

use url::Url;

/// Configuration for a single backend connection.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Backend base URL (e.g. `http://homeserver:5000`).
    pub url: Url,
    /// Inventory poll interval in seconds. 0 = never poll on a timer
    /// (out-of-band refreshes still work); used by the one-shot CLI mode.
    pub poll_interval_secs: u64,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Accept invalid TLS certificates (self-signed reverse proxies).
    pub accept_invalid_certs: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://127.0.0.1:5000").expect("static URL"),
            poll_interval_secs: 5,
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}
