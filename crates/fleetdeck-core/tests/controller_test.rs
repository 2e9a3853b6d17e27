#![allow(clippy::unwrap_used)]
// Integration tests for the Controller: the two-phase power protocol,
// action-triggered refreshes, and poll failure behavior, all against a
// wiremock backend.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetdeck_core::{
    AddMachineRequest, Controller, ControllerConfig, CoreError, MacAddress, PowerOp,
    PowerProgress,
};

// ── Helpers ─────────────────────────────────────────────────────────

const MAC: &str = "aa:bb:cc:dd:ee:ff";

fn machine_list() -> serde_json::Value {
    json!([{
        "vm_name": "nas",
        "mac": MAC,
        "host_ip": "10.0.0.5",
        "user": "admin",
        "method": "SSH",
        "status": "稼働中",
        "type": "physical"
    }])
}

async fn setup(server: &MockServer) -> Controller {
    Mock::given(method("GET"))
        .and(path("/api/vms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_list()))
        .mount(server)
        .await;

    let config = ControllerConfig {
        url: Url::parse(&server.uri()).unwrap(),
        poll_interval_secs: 0, // explicit fetches only; refresh trigger still works
        timeout: Duration::from_secs(5),
        accept_invalid_certs: false,
    };

    let controller = Controller::new(config).unwrap();
    controller.connect().await;
    // One-shot mode skips the startup fetch; pull the list explicitly so
    // challenge lookups have a populated store.
    controller.refresh().await.unwrap();
    controller
}

/// Wait until the store republishes its snapshot (the out-of-band refresh
/// lands asynchronously via the poller task). Subscribe BEFORE dispatching
/// the action, then await here.
async fn await_store_change(version: &mut tokio::sync::watch::Receiver<u64>) {
    tokio::time::timeout(Duration::from_secs(2), version.changed())
        .await
        .expect("refresh never happened")
        .unwrap();
}

// ── Two-phase protocol ──────────────────────────────────────────────

#[tokio::test]
async fn reboot_challenge_then_success() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    // Unauthenticated attempt: explicit null password → 401 challenge.
    Mock::given(method("POST"))
        .and(path("/api/power"))
        .and(body_json(json!({
            "mac": MAC, "action": "reboot", "password": null
        })))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Password required"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Credentialed replay → success.
    Mock::given(method("POST"))
        .and(path("/api/power"))
        .and(body_json(json!({
            "mac": MAC, "action": "reboot", "password": "secret"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "rebooted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut version = controller.store().subscribe_version();

    let progress = controller
        .begin_power(MacAddress::new(MAC), PowerOp::Reboot)
        .await
        .unwrap();

    // Challenge carries the target machine for the prompt message.
    let PowerProgress::Challenge { token, machine } = progress else {
        panic!("expected challenge, got {progress:?}");
    };
    let machine = machine.expect("challenge target should resolve from the fetched list");
    assert_eq!(machine.display_name, "nas");
    assert_eq!(machine.host_address.as_deref(), Some("10.0.0.5"));
    assert!(controller.pending_power().is_some());

    let progress = controller
        .resume_power(token, secrecy::SecretString::from("secret".to_owned()))
        .await
        .unwrap();

    assert_eq!(
        progress,
        PowerProgress::Completed {
            message: "rebooted".into()
        }
    );
    assert!(controller.pending_power().is_none());

    // Exactly one out-of-band inventory fetch follows the success.
    await_store_change(&mut version).await;

    controller.shutdown().await;
}

#[tokio::test]
async fn wake_succeeds_without_challenge() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .and(body_json(json!({
            "mac": MAC, "action": "wol", "password": null
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Magic Packet sent"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let progress = controller
        .begin_power(MacAddress::new(MAC), PowerOp::Wake)
        .await
        .unwrap();

    // 2xx on the first attempt never opens the prompt.
    assert_eq!(
        progress,
        PowerProgress::Completed {
            message: "Magic Packet sent".into()
        }
    );
    assert!(controller.pending_power().is_none());

    controller.shutdown().await;
}

#[tokio::test]
async fn second_challenge_reenters_prompt_without_limit() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    // Every attempt — with or without a password — answers 401.
    Mock::given(method("POST"))
        .and(path("/api/power"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Password required"})),
        )
        .mount(&server)
        .await;

    let progress = controller
        .begin_power(MacAddress::new(MAC), PowerOp::Off)
        .await
        .unwrap();
    let PowerProgress::Challenge { token, .. } = progress else {
        panic!("expected challenge");
    };

    // Wrong password → the same challenge again, same token, still pending.
    for _ in 0..3 {
        let progress = controller
            .resume_power(token, secrecy::SecretString::from("wrong".to_owned()))
            .await
            .unwrap();
        assert!(
            matches!(progress, PowerProgress::Challenge { token: t, .. } if t == token),
            "got {progress:?}"
        );
        assert!(controller.pending_power().is_some());
    }

    controller.shutdown().await;
}

#[tokio::test]
async fn cancel_clears_pending_without_backend_call() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Password required"})),
        )
        .expect(1) // only the initial attempt; cancel must not call again
        .mount(&server)
        .await;

    let progress = controller
        .begin_power(MacAddress::new(MAC), PowerOp::Off)
        .await
        .unwrap();
    let PowerProgress::Challenge { token, .. } = progress else {
        panic!("expected challenge");
    };

    controller.cancel_power(token);
    assert!(controller.pending_power().is_none());

    // A submit after cancel is dropped, not replayed.
    let progress = controller
        .resume_power(token, secrecy::SecretString::from("late".to_owned()))
        .await
        .unwrap();
    assert_eq!(progress, PowerProgress::Superseded);

    controller.shutdown().await;
}

#[tokio::test]
async fn superseded_pending_action_drops_stale_resolution() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Password required"})),
        )
        .expect(2) // two initiations; the stale resume never reaches the wire
        .mount(&server)
        .await;

    let first = controller
        .begin_power(MacAddress::new(MAC), PowerOp::Off)
        .await
        .unwrap();
    let PowerProgress::Challenge { token: first_token, .. } = first else {
        panic!("expected challenge");
    };

    // A second initiation supersedes the first pending action.
    let second = controller
        .begin_power(MacAddress::new(MAC), PowerOp::Reboot)
        .await
        .unwrap();
    let PowerProgress::Challenge { token: second_token, .. } = second else {
        panic!("expected challenge");
    };
    assert_ne!(first_token, second_token);

    let stale = controller
        .resume_power(first_token, secrecy::SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    assert_eq!(stale, PowerProgress::Superseded);

    // The current pending action is still the second one.
    let pending = controller.pending_power().unwrap();
    assert_eq!(pending.token, second_token);
    assert_eq!(pending.operation, PowerOp::Reboot);

    controller.shutdown().await;
}

#[tokio::test]
async fn power_rejection_surfaces_backend_text_and_clears_pending() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/power"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "IP unknown"})),
        )
        .mount(&server)
        .await;

    let err = controller
        .begin_power(MacAddress::new(MAC), PowerOp::Off)
        .await
        .unwrap_err();

    assert!(
        matches!(&err, CoreError::Backend { message } if message == "IP unknown"),
        "got {err:?}"
    );
    assert!(controller.pending_power().is_none());

    controller.shutdown().await;
}

// ── Mutations and refresh ───────────────────────────────────────────

#[tokio::test]
async fn successful_add_triggers_refresh() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/vms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut version = controller.store().subscribe_version();

    controller
        .add_machine(AddMachineRequest {
            vm_name: "new-box".into(),
            host_ip: "10.0.0.9".into(),
            mac: "11:22:33:44:55:66".into(),
            method: "SSH".into(),
            user: "root".into(),
            kind: "virtual".into(),
        })
        .await
        .unwrap();

    await_store_change(&mut version).await;
    controller.shutdown().await;
}

#[tokio::test]
async fn failed_add_reports_generic_error() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/vms"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Name already exists"})),
        )
        .mount(&server)
        .await;

    let err = controller
        .add_machine(AddMachineRequest {
            vm_name: "dup".into(),
            host_ip: String::new(),
            mac: "11:22:33:44:55:66".into(),
            method: "SSH".into(),
            user: "root".into(),
            kind: "virtual".into(),
        })
        .await
        .unwrap_err();

    // Backend detail is discarded: only a generic failure comes back.
    assert!(
        matches!(&err, CoreError::OperationFailed { message } if !message.contains("already exists")),
        "got {err:?}"
    );

    controller.shutdown().await;
}

#[tokio::test]
async fn successful_delete_triggers_refresh() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/vms/{MAC}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut version = controller.store().subscribe_version();

    controller.delete_machine(&MacAddress::new(MAC)).await;

    await_store_change(&mut version).await;
    controller.shutdown().await;
}

#[tokio::test]
async fn failed_delete_is_swallowed() {
    let server = MockServer::start().await;
    let controller = setup(&server).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/vms/{MAC}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    // No panic, no error surface — logged only.
    controller.delete_machine(&MacAddress::new(MAC)).await;

    controller.shutdown().await;
}

// ── Poll failure behavior ───────────────────────────────────────────

#[tokio::test]
async fn failed_refresh_retains_previous_snapshot() {
    let server = MockServer::start().await;

    // First fetch succeeds…
    Mock::given(method("GET"))
        .and(path("/api/vms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_list()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // …every later fetch fails.
    Mock::given(method("GET"))
        .and(path("/api/vms"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = ControllerConfig {
        url: Url::parse(&server.uri()).unwrap(),
        poll_interval_secs: 0,
        timeout: Duration::from_secs(5),
        accept_invalid_certs: false,
    };
    let controller = Controller::new(config).unwrap();
    controller.connect().await;
    controller.refresh().await.unwrap();
    assert_eq!(controller.machines_snapshot().len(), 1);

    let result = controller.refresh().await;
    assert!(result.is_err());

    // The stale-but-valid view survives the failed poll.
    assert_eq!(controller.machines_snapshot().len(), 1);
    assert_eq!(controller.machines_snapshot()[0].display_name, "nas");

    controller.shutdown().await;
}
