// Wire-level types for the backend REST surface.
//
// Field names mirror the backend's JSON exactly (`vm_name`, `host_ip`, ...).
// Domain conversion happens in `fleetdeck-core` — these structs stay dumb.

use serde::{Deserialize, Serialize};

/// One machine record as returned by `GET /api/vms`.
///
/// The backend merges live status data into the stored record before
/// responding, so `status` and `last_updated` may carry placeholder text
/// for machines whose probe hasn't completed yet.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineRecord {
    pub vm_name: String,
    pub mac: String,
    #[serde(default)]
    pub host_ip: Option<String>,
    #[serde(default)]
    pub user: String,
    /// Connect method hint: `"SSH"`, `"WinRM"`, `"API"`, or anything else.
    #[serde(default)]
    pub method: String,
    /// Free-text operational state, localized by the backend.
    #[serde(default)]
    pub status: String,
    /// `"physical"` or `"virtual"`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Wall-clock time of the backend's last status probe.
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Request body for `POST /api/vms`. Serialized verbatim — the backend
/// does its own validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMachineRequest {
    pub vm_name: String,
    pub host_ip: String,
    pub mac: String,
    pub method: String,
    pub user: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Request body for `POST /api/power`.
///
/// `password` is serialized as an explicit `null` on the unauthenticated
/// first attempt — the backend distinguishes "no password supplied" from
/// a missing key only loosely, and the original client always sent the key.
#[derive(Debug, Serialize)]
pub(crate) struct PowerRequest<'a> {
    pub mac: &'a str,
    pub action: &'a str,
    pub password: Option<&'a str>,
}

/// Success body from `POST /api/power` (2xx).
#[derive(Debug, Deserialize)]
pub(crate) struct PowerSuccess {
    #[serde(default)]
    pub message: String,
}

/// Structured error body: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
