#![allow(clippy::unwrap_used)]
// Integration tests for `InventoryClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetdeck_api::{AddMachineRequest, Error, InventoryClient, PowerOutcome};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, InventoryClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = InventoryClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn sample_record() -> serde_json::Value {
    json!({
        "vm_name": "nas",
        "mac": "aa:bb:cc:dd:ee:ff",
        "host_ip": "10.0.0.5",
        "user": "admin",
        "method": "SSH",
        "status": "稼働中",
        "type": "physical",
        "last_updated": "10:30:00"
    })
}

// ── Inventory tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_list_machines() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/vms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([sample_record()])))
        .mount(&server)
        .await;

    let machines = client.list_machines().await.unwrap();

    assert_eq!(machines.len(), 1);
    assert_eq!(machines[0].vm_name, "nas");
    assert_eq!(machines[0].mac, "aa:bb:cc:dd:ee:ff");
    assert_eq!(machines[0].host_ip.as_deref(), Some("10.0.0.5"));
    assert_eq!(machines[0].kind.as_deref(), Some("physical"));
}

#[tokio::test]
async fn test_list_machines_tolerates_sparse_records() {
    let (server, client) = setup().await;

    // A machine whose status probe hasn't completed: no IP, no kind.
    Mock::given(method("GET"))
        .and(path("/api/vms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "vm_name": "new-box", "mac": "11:22:33:44:55:66" }
        ])))
        .mount(&server)
        .await;

    let machines = client.list_machines().await.unwrap();
    assert_eq!(machines.len(), 1);
    assert_eq!(machines[0].host_ip, None);
    assert_eq!(machines[0].status, "");
}

#[tokio::test]
async fn test_list_machines_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/vms"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_machines().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_add_machine() {
    let (server, client) = setup().await;

    let request = AddMachineRequest {
        vm_name: "new-box".into(),
        host_ip: "10.0.0.9".into(),
        mac: "11:22:33:44:55:66".into(),
        method: "SSH".into(),
        user: "root".into(),
        kind: "virtual".into(),
    };

    Mock::given(method("POST"))
        .and(path("/api/vms"))
        .and(body_json(json!({
            "vm_name": "new-box",
            "host_ip": "10.0.0.9",
            "mac": "11:22:33:44:55:66",
            "method": "SSH",
            "user": "root",
            "type": "virtual"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    client.add_machine(&request).await.unwrap();
}

#[tokio::test]
async fn test_add_machine_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/vms"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Name already exists"})),
        )
        .mount(&server)
        .await;

    let request = AddMachineRequest {
        vm_name: "dup".into(),
        host_ip: String::new(),
        mac: "11:22:33:44:55:66".into(),
        method: "SSH".into(),
        user: "root".into(),
        kind: "virtual".into(),
    };

    let err = client.add_machine(&request).await.unwrap_err();
    assert!(
        matches!(&err, Error::Rejected { status: 400, message } if message == "Name already exists"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_delete_machine() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/vms/aa:bb:cc:dd:ee:ff"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    client.delete_machine("aa:bb:cc:dd:ee:ff").await.unwrap();
}

// ── Power tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_power_completed_without_password() {
    let (server, client) = setup().await;

    // The unauthenticated attempt must carry an explicit null password.
    Mock::given(method("POST"))
        .and(path("/api/power"))
        .and(body_json(json!({
            "mac": "aa:bb:cc:dd:ee:ff",
            "action": "wol",
            "password": null
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Magic Packet sent"})),
        )
        .mount(&server)
        .await;

    let outcome = client
        .power("aa:bb:cc:dd:ee:ff", "wol", None)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PowerOutcome::Completed {
            message: "Magic Packet sent".into()
        }
    );
}

#[tokio::test]
async fn test_power_auth_required() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": "Password required", "need_password": true})),
        )
        .mount(&server)
        .await;

    let outcome = client
        .power("aa:bb:cc:dd:ee:ff", "reboot", None)
        .await
        .unwrap();

    assert_eq!(outcome, PowerOutcome::AuthRequired);
}

#[tokio::test]
async fn test_power_replay_with_password() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .and(body_json(json!({
            "mac": "aa:bb:cc:dd:ee:ff",
            "action": "reboot",
            "password": "secret"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "rebooted"})),
        )
        .mount(&server)
        .await;

    let password = secrecy::SecretString::from("secret".to_owned());
    let outcome = client
        .power("aa:bb:cc:dd:ee:ff", "reboot", Some(&password))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PowerOutcome::Completed {
            message: "rebooted".into()
        }
    );
}

#[tokio::test]
async fn test_power_auth_required_even_with_password() {
    // A wrong password is indistinguishable from the first challenge:
    // the backend answers 401 again and the caller re-prompts.
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Password required"})),
        )
        .mount(&server)
        .await;

    let password = secrecy::SecretString::from("wrong".to_owned());
    let outcome = client
        .power("aa:bb:cc:dd:ee:ff", "off", Some(&password))
        .await
        .unwrap();

    assert_eq!(outcome, PowerOutcome::AuthRequired);
}

#[tokio::test]
async fn test_power_rejected_surfaces_backend_text() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "ssh: connection refused"})),
        )
        .mount(&server)
        .await;

    let err = client
        .power("aa:bb:cc:dd:ee:ff", "off", None)
        .await
        .unwrap_err();

    assert!(
        matches!(&err, Error::Rejected { status: 500, message } if message == "ssh: connection refused"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_power_network_failure() {
    // Connect to a server that is no longer listening.
    let (server, client) = setup().await;
    drop(server);

    let err = client
        .power("aa:bb:cc:dd:ee:ff", "off", None)
        .await
        .unwrap_err();

    assert!(err.is_network(), "got: {err:?}");
}

// ── URL construction ────────────────────────────────────────────────

#[tokio::test]
async fn test_rdp_url() {
    let (_server, client) = setup().await;

    let url = client.rdp_url("10.0.0.5").unwrap();
    assert!(url.as_str().ends_with("/api/rdp/10.0.0.5"));
}
