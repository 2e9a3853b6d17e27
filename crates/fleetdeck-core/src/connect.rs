// ── Connect action resolution ──
//
// Connect never talks to the backend. It resolves a machine into either a
// client-protocol URI (SSH) or a backend navigation URL (remote desktop),
// or fails locally — missing address and unrecognized methods short-circuit
// before any request could happen.

use fleetdeck_api::InventoryClient;
use url::Url;

use crate::error::CoreError;
use crate::model::{ConnectMethod, Machine};

/// Where a Connect action sends the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// A client-protocol URI (`ssh://user@host`) for the OS URI handler.
    Uri(String),
    /// A backend endpoint to navigate to; the backend establishes the
    /// session (e.g. serves an `.rdp` file).
    Navigation(Url),
}

impl ConnectTarget {
    /// The target as a plain string, whichever variant it is.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Uri(s) => s,
            Self::Navigation(u) => u.as_str(),
        }
    }
}

/// Resolve the Connect action for `machine`.
///
/// Local validation only: a missing host address or a method outside the
/// recognized set returns [`CoreError::ValidationFailed`] with zero
/// network or navigation calls issued.
pub fn connect_target(
    machine: &Machine,
    client: &InventoryClient,
) -> Result<ConnectTarget, CoreError> {
    let Some(host) = machine.host_address.as_deref() else {
        return Err(CoreError::ValidationFailed {
            message: format!("no host address known for {}", machine.display_name),
        });
    };

    match &machine.connect_method {
        ConnectMethod::Ssh => Ok(ConnectTarget::Uri(format!(
            "ssh://{}@{host}",
            machine.login_user
        ))),
        ConnectMethod::RemoteDesktop | ConnectMethod::Api => {
            let url = client.rdp_url(host).map_err(CoreError::from)?;
            Ok(ConnectTarget::Navigation(url))
        }
        ConnectMethod::Other(method) => Err(CoreError::ValidationFailed {
            message: format!(
                "connection method '{method}' is not supported for {}",
                machine.display_name
            ),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{MacAddress, MachineKind};

    fn client() -> InventoryClient {
        InventoryClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://backend:5000").unwrap(),
        )
    }

    fn machine(method: ConnectMethod, host: Option<&str>) -> Machine {
        Machine {
            identity: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            display_name: "nas".into(),
            host_address: host.map(String::from),
            login_user: "admin".into(),
            connect_method: method,
            status: String::new(),
            kind: MachineKind::Physical,
            last_updated: None,
        }
    }

    #[test]
    fn ssh_builds_client_uri() {
        let target = connect_target(&machine(ConnectMethod::Ssh, Some("10.0.0.5")), &client());
        assert_eq!(target.unwrap(), ConnectTarget::Uri("ssh://admin@10.0.0.5".into()));
    }

    #[test]
    fn remote_desktop_navigates_to_backend() {
        let target =
            connect_target(&machine(ConnectMethod::RemoteDesktop, Some("10.0.0.5")), &client())
                .unwrap();
        assert_eq!(target.as_str(), "http://backend:5000/api/rdp/10.0.0.5");
    }

    #[test]
    fn api_method_navigates_to_backend() {
        let target =
            connect_target(&machine(ConnectMethod::Api, Some("10.0.0.5")), &client()).unwrap();
        assert!(matches!(target, ConnectTarget::Navigation(_)));
    }

    #[test]
    fn missing_address_fails_locally() {
        let err = connect_target(&machine(ConnectMethod::Ssh, None), &client()).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn unrecognized_method_fails_locally() {
        let err = connect_target(
            &machine(ConnectMethod::Other("Telnet".into()), Some("10.0.0.5")),
            &client(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }
}
