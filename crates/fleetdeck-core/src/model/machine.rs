// ── Core machine types ──
//
// MacAddress is the sole correlation key for power/delete/connect:
// display names are human labels and are never assumed unique.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The backend's token for an operational machine. Status strings are
/// free-text and localized; classification is an exact match against this
/// one token, everything else counts as stopped. A backend-supplied closed
/// enum would be sturdier, but this is the wire contract we have.
pub const RUNNING_STATUS: &str = "稼働中";

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().to_lowercase().replace('-', ":");
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ── MachineKind ─────────────────────────────────────────────────────

/// Physical hosts are eligible for wake-on-LAN; virtual machines are not.
///
/// Unknown wire values decode as `Virtual` — the conservative bucket, since
/// offering WOL for a machine we cannot prove is physical would only
/// produce a backend rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineKind {
    Physical,
    #[default]
    Virtual,
}

impl MachineKind {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("physical") => Self::Physical,
            _ => Self::Virtual,
        }
    }
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Physical => write!(f, "physical"),
            Self::Virtual => write!(f, "virtual"),
        }
    }
}

// ── ConnectMethod ───────────────────────────────────────────────────

/// How to reach a machine interactively. An open enumeration: the backend
/// stores free text, and values outside the recognized set are preserved
/// verbatim so they can round-trip through display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectMethod {
    Ssh,
    RemoteDesktop,
    Api,
    Other(String),
}

impl ConnectMethod {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "SSH" => Self::Ssh,
            "WinRM" => Self::RemoteDesktop,
            "API" => Self::Api,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The backend's wire token for this method.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Ssh => "SSH",
            Self::RemoteDesktop => "WinRM",
            Self::Api => "API",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for ConnectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

// ── Machine ─────────────────────────────────────────────────────────

/// One managed machine as known to the client.
///
/// Read-only: the backend's list is the sole source of truth, and each
/// poll replaces the previous snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    /// Hardware address — the unique key, stable across renames.
    pub identity: MacAddress,
    pub display_name: String,
    /// Current network address; `None` when unknown.
    pub host_address: Option<String>,
    pub login_user: String,
    pub connect_method: ConnectMethod,
    /// Raw operational state as reported by the backend.
    pub status: String,
    pub kind: MachineKind,
    /// Wall-clock time of the backend's last status probe, if reported.
    pub last_updated: Option<String>,
}

impl Machine {
    /// Binary running/stopped classification: exact match against
    /// [`RUNNING_STATUS`]. "Starting", "error", and near-miss strings all
    /// classify as stopped.
    pub fn is_running(&self) -> bool {
        self.status == RUNNING_STATUS
    }

    /// Whether the wake-on-LAN action applies to this machine.
    pub fn supports_wake(&self) -> bool {
        self.kind == MachineKind::Physical
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn machine(status: &str, kind: MachineKind) -> Machine {
        Machine {
            identity: MacAddress::new("AA:BB:CC:DD:EE:FF"),
            display_name: "nas".into(),
            host_address: Some("10.0.0.5".into()),
            login_user: "admin".into(),
            connect_method: ConnectMethod::Ssh,
            status: status.into(),
            kind,
            last_updated: None,
        }
    }

    #[test]
    fn mac_normalizes_dashes_and_case() {
        let mac = MacAddress::new("AA-BB-CC-DD-EE-FF");
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn running_requires_exact_token() {
        assert!(machine(RUNNING_STATUS, MachineKind::Virtual).is_running());
        // Near-misses classify as stopped.
        assert!(!machine("稼働中...", MachineKind::Virtual).is_running());
        assert!(!machine("running", MachineKind::Virtual).is_running());
        assert!(!machine("取得中...", MachineKind::Virtual).is_running());
        assert!(!machine("", MachineKind::Virtual).is_running());
    }

    #[test]
    fn wake_only_for_physical() {
        assert!(machine(RUNNING_STATUS, MachineKind::Physical).supports_wake());
        assert!(!machine(RUNNING_STATUS, MachineKind::Virtual).supports_wake());
    }

    #[test]
    fn unknown_kind_decodes_as_virtual() {
        assert_eq!(MachineKind::from_wire(None), MachineKind::Virtual);
        assert_eq!(MachineKind::from_wire(Some("container")), MachineKind::Virtual);
        assert_eq!(MachineKind::from_wire(Some("physical")), MachineKind::Physical);
    }

    #[test]
    fn connect_method_round_trips() {
        assert_eq!(ConnectMethod::from_wire("SSH"), ConnectMethod::Ssh);
        assert_eq!(ConnectMethod::from_wire("WinRM"), ConnectMethod::RemoteDesktop);
        assert_eq!(ConnectMethod::from_wire("API"), ConnectMethod::Api);
        let other = ConnectMethod::from_wire("Telnet");
        assert_eq!(other, ConnectMethod::Other("Telnet".into()));
        assert_eq!(other.as_wire(), "Telnet");
    }
}
