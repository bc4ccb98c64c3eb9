//! HTTP gateway client integration tests

use std::time::Duration;

use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
use beacon_nodes::{Dispatcher, Error, GatewayClient, HttpGatewayClient};
use serde_json::{Value, json};

/// Minimal gateway answering `node.list` and `node.invoke`
async fn rpc(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer secret");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "ok": false })));
    }

    let response = match body["method"].as_str() {
        Some("node.list") => json!({
            "ok": true,
            "payload": {
                "nodes": [
                    { "nodeId": "mac-123", "displayName": "Studio Mac", "caps": ["canvas"], "connected": true }
                ]
            }
        }),
        Some("node.invoke") => json!({
            "ok": true,
            "payload": {
                "ok": true,
                "nodeId": body["params"]["nodeId"],
                "payload": { "echo": body["params"]["command"] }
            }
        }),
        _ => json!({
            "ok": false,
            "error": { "code": "INVALID_REQUEST", "message": "unknown method" }
        }),
    };

    (StatusCode::OK, Json(response))
}

/// Start a local gateway and return its base URL
async fn spawn_gateway() -> String {
    let app = Router::new().route("/rpc", post(rpc));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn test_call_returns_payload() {
    let url = spawn_gateway().await;
    let client = HttpGatewayClient::new(url, Some("secret".to_string()));

    let value = client
        .call("node.list", None, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(value["nodes"][0]["nodeId"], "mac-123");
}

#[tokio::test]
async fn test_call_surfaces_gateway_errors() {
    let url = spawn_gateway().await;
    let client = HttpGatewayClient::new(url, Some("secret".to_string()));

    let err = client
        .call("node.pair.list", None, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "gateway error: node.pair.list failed: INVALID_REQUEST: unknown method"
    );
}

#[tokio::test]
async fn test_call_rejects_http_failure() {
    let url = spawn_gateway().await;
    let client = HttpGatewayClient::new(url, None);

    let err = client
        .call("node.list", None, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Gateway(ref m) if m.contains("401")));
}

#[tokio::test]
async fn test_dispatcher_over_http() {
    let url = spawn_gateway().await;
    let client = HttpGatewayClient::new(url, Some("secret".to_string()));
    let dispatcher = Dispatcher::new(std::sync::Arc::new(client), Duration::from_secs(5), "canvas");

    let payload = dispatcher
        .invoke(Some("Studio-Mac"), "canvas.hide", None)
        .await
        .unwrap();
    assert_eq!(payload, json!({ "echo": "canvas.hide" }));
}
