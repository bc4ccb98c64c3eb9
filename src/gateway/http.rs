//! HTTP transport for gateway RPC calls

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::GatewayClient;
use crate::{Error, Result};

/// RPC request body posted to `{base_url}/rpc`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcRequest<'a> {
    id: String,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
    timeout_ms: u64,
}

/// RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    ok: bool,
    payload: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: Option<String>,
    message: Option<String>,
}

/// Gateway client speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    /// HTTP client
    client: Client,
    /// Gateway base URL
    base_url: String,
    /// Optional bearer token
    token: Option<String>,
}

impl HttpGatewayClient {
    /// Create a new gateway client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Gateway base URL (e.g., <http://127.0.0.1:18789>)
    /// * `token` - Optional bearer token for authentication
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Build the authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn call(&self, method: &str, params: Option<Value>, timeout: Duration) -> Result<Value> {
        let url = format!("{}/rpc", self.base_url);
        let body = RpcRequest {
            id: Uuid::new_v4().to_string(),
            method,
            params,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };

        let mut req = self.client.post(&url).timeout(timeout).json(&body);

        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        tracing::debug!(method, url = %url, "gateway call");
        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Gateway(format!("{method} failed: {status} - {body}")));
        }

        let envelope: RpcResponse = response.json().await?;
        unwrap_response(method, envelope)
    }
}

fn unwrap_response(method: &str, envelope: RpcResponse) -> Result<Value> {
    if envelope.ok {
        return Ok(envelope.payload.unwrap_or(Value::Null));
    }

    let (code, message) = envelope
        .error
        .map(|e| (e.code, e.message))
        .unwrap_or_default();
    let message = message.unwrap_or_else(|| "unknown error".to_string());
    Err(Error::Gateway(match code {
        Some(code) => format!("{method} failed: {code}: {message}"),
        None => format!("{method} failed: {message}"),
    }))
}
