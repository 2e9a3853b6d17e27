// ── Wire → domain conversion ──
//
// `fleetdeck-api` hands over records with the backend's raw field names;
// everything downstream works with the canonical `Machine` type.

use fleetdeck_api::MachineRecord;

use crate::model::{ConnectMethod, MacAddress, Machine, MachineKind};

impl From<MachineRecord> for Machine {
    fn from(record: MachineRecord) -> Self {
        // The backend uses "-" as its own unknown-address placeholder;
        // normalize that to absence so the view layer owns presentation.
        let host_address = record
            .host_ip
            .filter(|ip| !ip.is_empty() && ip != "-" && ip != "null");

        Self {
            identity: MacAddress::new(&record.mac),
            display_name: record.vm_name,
            host_address,
            login_user: record.user,
            connect_method: ConnectMethod::from_wire(&record.method),
            status: record.status,
            kind: MachineKind::from_wire(record.kind.as_deref()),
            last_updated: record.last_updated,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> MachineRecord {
        serde_json::from_value(serde_json::json!({
            "vm_name": "nas",
            "mac": "AA:BB:CC:DD:EE:FF",
            "host_ip": "10.0.0.5",
            "user": "admin",
            "method": "SSH",
            "status": "稼働中",
            "type": "physical"
        }))
        .unwrap()
    }

    #[test]
    fn converts_full_record() {
        let machine = Machine::from(record());
        assert_eq!(machine.identity.as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(machine.display_name, "nas");
        assert_eq!(machine.host_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(machine.connect_method, ConnectMethod::Ssh);
        assert_eq!(machine.kind, MachineKind::Physical);
        assert!(machine.is_running());
    }

    #[test]
    fn placeholder_addresses_become_absent() {
        for placeholder in ["-", "null", ""] {
            let mut raw = record();
            raw.host_ip = Some(placeholder.into());
            let machine = Machine::from(raw);
            assert_eq!(machine.host_address, None, "for {placeholder:?}");
        }
    }
}
