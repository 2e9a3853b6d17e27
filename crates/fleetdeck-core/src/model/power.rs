// ── Power operations ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A power lifecycle operation dispatched through `POST /api/power`.
///
/// The serde/strum representations are the backend's wire tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerOp {
    /// Shut the machine down.
    Off,
    /// Reboot the machine.
    Reboot,
    /// Wake-on-LAN magic packet. Physical machines only; the backend
    /// rejects it for virtual ones.
    #[serde(rename = "wol")]
    #[strum(serialize = "wol")]
    Wake,
}

impl PowerOp {
    /// The backend's token for this operation.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Reboot => "reboot",
            Self::Wake => "wol",
        }
    }

    /// Human verb for notifications ("Powering off nas").
    pub fn verb(self) -> &'static str {
        match self {
            Self::Off => "power off",
            Self::Reboot => "reboot",
            Self::Wake => "wake",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn wire_tokens() {
        assert_eq!(PowerOp::Off.as_wire(), "off");
        assert_eq!(PowerOp::Reboot.as_wire(), "reboot");
        assert_eq!(PowerOp::Wake.as_wire(), "wol");
    }

    #[test]
    fn parses_wire_tokens() {
        assert_eq!(PowerOp::from_str("wol").ok(), Some(PowerOp::Wake));
        assert_eq!(PowerOp::from_str("off").ok(), Some(PowerOp::Off));
        assert_eq!(PowerOp::from_str("reboot").ok(), Some(PowerOp::Reboot));
        assert!(PowerOp::from_str("suspend").is_err());
    }
}
