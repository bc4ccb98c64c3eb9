//! Directory, resolution and dispatch integration tests

use std::time::Duration;

use beacon_nodes::{CanvasCommand, Error, SnapshotPayload, UiVersion};
use serde_json::json;

mod common;
use common::{FakeGateway, dispatcher, studio_fleet};

#[tokio::test]
async fn test_directory_uses_live_list() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());

    let nodes = dispatcher(&gateway).directory().await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].node_id, "mac-123");
    assert_eq!(gateway.methods(), vec!["node.list"]);
}

#[tokio::test]
async fn test_directory_falls_back_on_error() {
    let gateway = FakeGateway::new();
    gateway.fail("node.list", "connection reset");
    gateway.respond(
        "node.pair.list",
        json!({
            "pending": [{ "requestId": "r-1", "nodeId": "new-ipad", "displayName": "New iPad" }],
            "paired": [{ "nodeId": "pc-7", "displayName": "Desk PC", "remoteIp": "10.0.0.7" }]
        }),
    );

    let nodes = dispatcher(&gateway).directory().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].node_id, "pc-7");
    assert!(nodes[0].caps.is_none());
    assert!(nodes[0].connected.is_none());
    assert_eq!(gateway.methods(), vec!["node.list", "node.pair.list"]);
}

#[tokio::test]
async fn test_directory_falls_back_without_nodes_field() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", json!({ "ts": 1 }));
    gateway.respond("node.pair.list", json!({ "pending": [], "paired": [] }));

    let nodes = dispatcher(&gateway).directory().await.unwrap();
    assert!(nodes.is_empty());
    assert_eq!(gateway.methods(), vec!["node.list", "node.pair.list"]);
}

#[tokio::test]
async fn test_directory_fails_when_both_listings_fail() {
    let gateway = FakeGateway::new();
    gateway.fail("node.list", "timeout");
    gateway.fail("node.pair.list", "timeout again");

    let err = dispatcher(&gateway).directory().await.unwrap_err();
    match err {
        Error::DirectoryFetch { primary, fallback } => {
            assert!(primary.contains("timeout"));
            assert!(fallback.contains("timeout again"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_resolve_by_display_name() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());

    let node_id = dispatcher(&gateway).resolve(Some("studio mac")).await.unwrap();
    assert_eq!(node_id, "mac-123");
}

#[tokio::test]
async fn test_resolve_default_prefers_connected() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());

    let node_id = dispatcher(&gateway).resolve(None).await.unwrap();
    assert_eq!(node_id, "mac-123");
}

#[tokio::test]
async fn test_resolve_refetches_every_time() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    let dispatcher = dispatcher(&gateway);

    assert_eq!(dispatcher.resolve(None).await.unwrap(), "mac-123");

    // Studio Mac goes offline; the PC is now the only connected node
    gateway.respond(
        "node.list",
        json!({
            "nodes": [
                { "nodeId": "mac-123", "caps": ["canvas"], "connected": false },
                { "nodeId": "pc-7", "caps": ["canvas"], "connected": true }
            ]
        }),
    );
    assert_eq!(dispatcher.resolve(None).await.unwrap(), "pc-7");
    assert_eq!(gateway.methods(), vec!["node.list", "node.list"]);
}

#[tokio::test]
async fn test_invoke_sends_envelope() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    gateway.respond(
        "node.invoke",
        json!({ "ok": true, "nodeId": "pc-7", "payload": { "result": "4" } }),
    );

    let payload = dispatcher(&gateway)
        .canvas(
            Some("pc-7"),
            &CanvasCommand::Eval {
                javascript: "2 + 2".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(payload, json!({ "result": "4" }));

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    let invoke = &calls[1];
    assert_eq!(invoke.method, "node.invoke");
    assert_eq!(invoke.timeout, Duration::from_millis(1500));

    let params = invoke.params.as_ref().unwrap();
    assert_eq!(params["nodeId"], "pc-7");
    assert_eq!(params["command"], "canvas.eval");
    assert_eq!(params["params"], json!({ "javaScript": "2 + 2" }));
    assert!(!params["idempotencyKey"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_invoke_uses_fresh_idempotency_keys() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    gateway.respond("node.invoke", json!({ "ok": true }));
    let dispatcher = dispatcher(&gateway);

    dispatcher.canvas(None, &CanvasCommand::Hide).await.unwrap();
    dispatcher.canvas(None, &CanvasCommand::Hide).await.unwrap();

    let keys: Vec<String> = gateway
        .calls()
        .into_iter()
        .filter(|c| c.method == "node.invoke")
        .map(|c| c.params.unwrap()["idempotencyKey"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys.len(), 2);
    assert_ne!(keys[0], keys[1]);
}

#[tokio::test]
async fn test_invoke_without_params_omits_field() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    gateway.respond("node.invoke", json!({ "ok": true }));

    let payload = dispatcher(&gateway)
        .canvas(None, &CanvasCommand::A2uiReset)
        .await
        .unwrap();
    assert_eq!(payload, json!({ "ok": true }));

    let invoke = gateway.calls().pop().unwrap();
    let params = invoke.params.unwrap();
    assert_eq!(params["command"], "canvas.a2ui.reset");
    assert!(params.get("params").is_none());
}

#[tokio::test]
async fn test_unknown_node_never_invokes() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    gateway.respond("node.invoke", json!({ "ok": true }));

    let err = dispatcher(&gateway)
        .canvas(Some("mac-1"), &CanvasCommand::Hide)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown node: mac-1 (known: Studio Mac, pc-7)"
    );
    assert_eq!(gateway.methods(), vec!["node.list"]);
}

#[tokio::test]
async fn test_gateway_invoke_error_passes_through() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    gateway.fail("node.invoke", "node.invoke failed: NODE_DISCONNECTED: gone");

    let err = dispatcher(&gateway)
        .canvas(None, &CanvasCommand::Hide)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Gateway(ref m) if m.contains("NODE_DISCONNECTED")));
}

#[tokio::test]
async fn test_push_a2ui_forwards_valid_stream() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    gateway.respond("node.invoke", json!({ "ok": true }));

    let jsonl = "{\"beginRendering\":{\"surfaceId\":\"main\",\"root\":\"root\"}}\n\
                 {\"surfaceUpdate\":{\"surfaceId\":\"main\",\"components\":[]}}";
    let summary = dispatcher(&gateway).push_a2ui(None, jsonl).await.unwrap();
    assert_eq!(summary.version, UiVersion::V0_8);
    assert_eq!(summary.message_count, 2);

    let invoke = gateway.calls().pop().unwrap();
    let params = invoke.params.unwrap();
    assert_eq!(params["command"], "canvas.a2ui.pushJSONL");
    assert_eq!(params["params"]["jsonl"], jsonl);
}

#[tokio::test]
async fn test_push_a2ui_rejects_invalid_stream_before_gateway() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());

    let err = dispatcher(&gateway)
        .push_a2ui(None, "{\"createSurface\":{}}\n{\"beginRendering\":{}}")
        .await
        .unwrap_err();
    match err {
        Error::InvalidStream(errors) => {
            assert_eq!(errors.lines(), vec!["mixed A2UI v0.8 and v0.9 messages"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_push_a2ui_rejects_v09_stream() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());

    let err = dispatcher(&gateway)
        .push_a2ui(None, "{\"createSurface\":{\"surfaceId\":\"main\"}}")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedProtocolVersion(UiVersion::V0_9)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_snapshot_payload_written_to_disk() {
    let gateway = FakeGateway::new();
    gateway.respond("node.list", studio_fleet());
    gateway.respond(
        "node.invoke",
        json!({ "ok": true, "payload": { "format": "png", "base64": "iVBORw0KGgo=" } }),
    );

    let payload = dispatcher(&gateway)
        .canvas(
            None,
            &CanvasCommand::Snapshot {
                format: beacon_nodes::SnapshotFormat::Png,
                max_width: Some(800),
                quality: None,
            },
        )
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let snapshot = SnapshotPayload::from_payload(&payload).unwrap();
    let path = snapshot.write(None, dir.path()).await.unwrap();

    assert!(path.starts_with(dir.path()));
    assert_eq!(path.extension().unwrap(), "png");
    assert_eq!(
        std::fs::read(&path).unwrap(),
        vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]
    );
}
