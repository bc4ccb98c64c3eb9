//! Node command dispatch
//!
//! Resolves a target node from a fresh directory snapshot and forwards one
//! `node.invoke` call per command. Retries and timeouts belong to the
//! gateway transport.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::Result;
use crate::canvas::CanvasCommand;
use crate::canvas::a2ui::{self, StreamSummary};
use crate::gateway::{GatewayClient, METHOD_NODE_INVOKE};
use crate::nodes::{InvokeRequest, NodeRecord, fetch_directory, resolve_node};

/// Forwards commands to a resolved node through the gateway
#[derive(Clone)]
pub struct Dispatcher {
    gateway: Arc<dyn GatewayClient>,
    timeout: Duration,
    capability: String,
}

impl Dispatcher {
    /// Create a dispatcher targeting nodes with `capability`
    #[must_use]
    pub fn new(gateway: Arc<dyn GatewayClient>, timeout: Duration, capability: impl Into<String>) -> Self {
        Self {
            gateway,
            timeout,
            capability: capability.into(),
        }
    }

    /// Fetch the current directory snapshot
    ///
    /// # Errors
    ///
    /// Returns error if both directory listings fail
    pub async fn directory(&self) -> Result<Vec<NodeRecord>> {
        fetch_directory(self.gateway.as_ref(), self.timeout).await
    }

    /// Resolve `query` (or the default node) to a node id
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be fetched or resolution fails
    pub async fn resolve(&self, query: Option<&str>) -> Result<String> {
        let nodes = self.directory().await?;
        let node_id = resolve_node(query, &nodes, &self.capability)?;
        tracing::debug!(node_id = %node_id, query = ?query, "resolved node");
        Ok(node_id)
    }

    /// Resolve the target and invoke `command` on it
    ///
    /// Returns the command's `payload`, or the raw response when it has none.
    ///
    /// # Errors
    ///
    /// Returns error if resolution fails or the gateway call fails
    pub async fn invoke(&self, query: Option<&str>, command: &str, params: Option<Value>) -> Result<Value> {
        let node_id = self.resolve(query).await?;
        let request = InvokeRequest {
            node_id,
            command: command.to_string(),
            params,
            idempotency_key: Uuid::new_v4().to_string(),
        };

        tracing::info!(
            node_id = %request.node_id,
            command,
            idempotency_key = %request.idempotency_key,
            "invoking node command"
        );

        let response = self
            .gateway
            .call(METHOD_NODE_INVOKE, Some(serde_json::to_value(&request)?), self.timeout)
            .await?;

        Ok(match response {
            Value::Object(mut map) if map.contains_key("payload") => {
                map.remove("payload").unwrap_or(Value::Null)
            }
            other => other,
        })
    }

    /// Send a canvas command to the target node
    ///
    /// # Errors
    ///
    /// Returns error if resolution fails or the gateway call fails
    pub async fn canvas(&self, query: Option<&str>, command: &CanvasCommand) -> Result<Value> {
        self.invoke(query, command.name(), command.params()).await
    }

    /// Validate an A2UI stream and push it to the target node
    ///
    /// Invalid or unsupported streams never reach the gateway.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStream` or `UnsupportedProtocolVersion` before any
    /// gateway call, or the resolution/gateway error afterwards
    pub async fn push_a2ui(&self, query: Option<&str>, jsonl: &str) -> Result<StreamSummary> {
        let summary = a2ui::ensure_supported(a2ui::validate_jsonl(jsonl)?)?;
        let command = CanvasCommand::A2uiPush {
            jsonl: jsonl.to_string(),
        };
        self.canvas(query, &command).await?;
        Ok(summary)
    }
}
