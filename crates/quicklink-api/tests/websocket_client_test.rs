#![allow(clippy::unwrap_used)]
// Integration tests for `HassClient` against an in-process WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use quicklink_api::{Error, HassClient, RawEntry, RawTarget, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

type ServerWs = WebSocketStream<TcpStream>;

async fn spawn_server<F, Fut>(handler: F) -> Url
where
    F: FnOnce(ServerWs) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        handler(ws).await;
    });
    Url::parse(&format!("ws://{addr}/api/websocket")).unwrap()
}

async fn send_json(ws: &mut ServerWs, value: Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

async fn recv_json(ws: &mut ServerWs) -> Value {
    loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            _ => continue,
        }
    }
}

/// Run the server side of a successful handshake.
async fn accept_auth(ws: &mut ServerWs) {
    send_json(ws, json!({"type": "auth_required", "ha_version": "2024.6.0"})).await;
    let auth = recv_json(ws).await;
    assert_eq!(auth["type"], "auth");
    assert_eq!(auth["access_token"], "test-token");
    send_json(ws, json!({"type": "auth_ok", "ha_version": "2024.6.0"})).await;
}

async fn drain(mut ws: ServerWs) {
    while let Some(Ok(_)) = ws.next().await {}
}

fn token() -> SecretString {
    "test-token".to_string().into()
}

fn transport(timeout: Duration) -> TransportConfig {
    TransportConfig {
        timeout,
        ..TransportConfig::default()
    }
}

// ── Handshake tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_handshake_reports_version() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    assert_eq!(client.ha_version(), Some("2024.6.0"));
    client.close();
}

#[tokio::test]
async fn test_invalid_token_is_authentication_error() {
    let url = spawn_server(|mut ws| async move {
        send_json(&mut ws, json!({"type": "auth_required"})).await;
        let _ = recv_json(&mut ws).await;
        send_json(
            &mut ws,
            json!({"type": "auth_invalid", "message": "Invalid access token or password"}),
        )
        .await;
    })
    .await;

    let result = HassClient::connect(url, &token(), &TransportConfig::default()).await;
    match result {
        Err(Error::Authentication { message }) => {
            assert_eq!(message, "Invalid access token or password");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_first_frame_is_handshake_error() {
    let url = spawn_server(|mut ws| async move {
        send_json(&mut ws, json!({"type": "event"})).await;
        drain(ws).await;
    })
    .await;

    let result = HassClient::connect(url, &token(), &TransportConfig::default()).await;
    assert!(
        matches!(result, Err(Error::Handshake { .. })),
        "expected Handshake error, got: {result:?}"
    );
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_entries() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        let cmd = recv_json(&mut ws).await;
        assert_eq!(cmd["type"], "quick_automation/list");
        send_json(
            &mut ws,
            json!({
                "id": cmd["id"],
                "type": "result",
                "success": true,
                "result": [{
                    "entry_id": "e1",
                    "title": "Switch - Lamp",
                    "enabled": true,
                    "source": {"device_id": "dev-switch"},
                    "destination": {"entity_id": "light.lamp"},
                    "links": [{
                        "type": "on_off",
                        "enabled": true,
                        "reverse": false,
                        "extra": "",
                        "triggers": [],
                        "trigger": null
                    }]
                }]
            }),
        )
        .await;
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    let entries = client.list_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry_id.as_deref(), Some("e1"));
    assert_eq!(entries[0].source.device_id.as_deref(), Some("dev-switch"));
    assert_eq!(entries[0].links[0].link_type, "on_off");
}

#[tokio::test]
async fn test_command_ids_increase() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        let mut last = 0;
        for _ in 0..3 {
            let cmd = recv_json(&mut ws).await;
            let id = cmd["id"].as_u64().unwrap();
            assert!(id > last, "id {id} should exceed {last}");
            last = id;
            send_json(
                &mut ws,
                json!({"id": id, "type": "result", "success": true, "result": null}),
            )
            .await;
        }
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    client.toggle_enabled("e1", false).await.unwrap();
    client.toggle_enabled("e1", true).await.unwrap();
    client.remove_entry("e1").await.unwrap();
}

#[tokio::test]
async fn test_update_entry_payload_for_create() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        let cmd = recv_json(&mut ws).await;
        assert_eq!(cmd["type"], "quick_automation/update_entry");
        assert!(cmd.get("entry_id").is_none(), "create must omit entry_id");
        assert_eq!(cmd["title"], "Kitchen - Hallway");
        assert_eq!(cmd["source"], json!({"entity_id": "light.kitchen"}));
        assert_eq!(cmd["links"], json!([]));
        send_json(
            &mut ws,
            json!({"id": cmd["id"], "type": "result", "success": true, "result": null}),
        )
        .await;
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    let entry = RawEntry {
        entry_id: None,
        title: "Kitchen - Hallway".into(),
        enabled: true,
        source: RawTarget {
            entity_id: Some("light.kitchen".into()),
            device_id: None,
        },
        destination: RawTarget {
            entity_id: Some("light.hallway".into()),
            device_id: None,
        },
        links: Vec::new(),
    };
    client.update_entry(&entry).await.unwrap();
}

#[tokio::test]
async fn test_load_trigger_action() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        let cmd = recv_json(&mut ws).await;
        assert_eq!(cmd["type"], "quick_automation/load_trigger_action");
        assert_eq!(cmd["source"], json!({"device_id": "remote"}));
        assert_eq!(cmd["destination"], json!({"entity_id": "light.lamp"}));
        send_json(
            &mut ws,
            json!({
                "id": cmd["id"],
                "type": "result",
                "success": true,
                "result": {
                    "title": "Remote - Lamp",
                    "links": [
                        {"type": "toggle", "enabled": true, "triggers": ["single", "double"], "trigger": "single"},
                        {"type": "brightness", "enabled": true, "reverse": false, "triggers": []}
                    ]
                }
            }),
        )
        .await;
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    let resolution = client
        .load_trigger_action(
            &RawTarget {
                entity_id: None,
                device_id: Some("remote".into()),
            },
            &RawTarget {
                entity_id: Some("light.lamp".into()),
                device_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(resolution.title, "Remote - Lamp");
    assert_eq!(resolution.links.len(), 2);
    assert_eq!(resolution.links[0].trigger.as_deref(), Some("single"));
}

#[tokio::test]
async fn test_failed_command_is_command_error() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        let cmd = recv_json(&mut ws).await;
        send_json(
            &mut ws,
            json!({
                "id": cmd["id"],
                "type": "result",
                "success": false,
                "error": {"code": "not_found", "message": "Entry not found"}
            }),
        )
        .await;
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    let result = client.remove_entry("missing").await;
    match result {
        Err(err) => assert_eq!(err.command_error_code(), Some("not_found")),
        Ok(()) => panic!("expected command failure"),
    }
}

// ── Connection failure tests ────────────────────────────────────────

#[tokio::test]
async fn test_server_disconnect_fails_pending_call() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        let _ = recv_json(&mut ws).await;
        drop(ws);
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    let result = client.list_entries().await;
    assert!(
        matches!(result, Err(Error::ConnectionClosed { .. })),
        "expected ConnectionClosed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_calls_racing_a_disconnect_fail_fast() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        drop(ws);
    })
    .await;

    let client = HassClient::connect(url, &token(), &transport(Duration::from_secs(30)))
        .await
        .unwrap();
    let calls = (0..50).map(|_| client.list_entries());
    let results = tokio::time::timeout(
        Duration::from_secs(5),
        futures_util::future::join_all(calls),
    )
    .await
    .expect("calls should not wait for the command timeout");

    for result in results {
        assert!(
            matches!(result, Err(Error::ConnectionClosed { .. })),
            "expected ConnectionClosed, got: {result:?}"
        );
    }
    assert!(client.is_closed());
}

#[tokio::test]
async fn test_unanswered_command_times_out() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &transport(Duration::from_millis(300)))
        .await
        .unwrap();
    let result = client.list_entries().await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_call_after_close_fails() {
    let url = spawn_server(|mut ws| async move {
        accept_auth(&mut ws).await;
        drain(ws).await;
    })
    .await;

    let client = HassClient::connect(url, &token(), &TransportConfig::default())
        .await
        .unwrap();
    client.close();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.is_closed());
    let result = client.list_entries().await;
    assert!(result.is_err());
}
