//! Node directory snapshot
//!
//! Prefers the live `node.list` listing and falls back to the approved
//! entries of `node.pair.list`. Both shapes collapse into `NodeRecord`.

use std::time::Duration;

use serde_json::Value;

use super::types::{NodeListResponse, NodeRecord, PairListResponse};
use crate::gateway::{GatewayClient, METHOD_NODE_LIST, METHOD_NODE_PAIR_LIST};
use crate::{Error, Result};

/// Fetch one consistent snapshot of the node fleet
///
/// Any failure of the live listing, including a response without `nodes`,
/// triggers the pairing fallback.
///
/// # Errors
///
/// Returns `DirectoryFetch` if both listings fail
pub async fn fetch_directory(
    gateway: &dyn GatewayClient,
    timeout: Duration,
) -> Result<Vec<NodeRecord>> {
    let primary = match gateway.call(METHOD_NODE_LIST, None, timeout).await {
        Ok(value) => match live_records(value) {
            Ok(nodes) => {
                tracing::debug!(count = nodes.len(), "fetched live node list");
                return Ok(nodes);
            }
            Err(e) => e,
        },
        Err(e) => e.to_string(),
    };

    tracing::warn!(error = %primary, "node.list unavailable, falling back to pairing list");

    let fallback = gateway
        .call(METHOD_NODE_PAIR_LIST, None, timeout)
        .await
        .and_then(paired_records);

    match fallback {
        Ok(nodes) => {
            tracing::debug!(count = nodes.len(), "fetched paired node list");
            Ok(nodes)
        }
        Err(e) => Err(Error::DirectoryFetch {
            primary,
            fallback: e.to_string(),
        }),
    }
}

/// Map a `node.list` payload, failing with a reason when `nodes` is missing
fn live_records(value: Value) -> std::result::Result<Vec<NodeRecord>, String> {
    let response: NodeListResponse =
        serde_json::from_value(value).map_err(|e| format!("malformed node.list response: {e}"))?;
    response
        .nodes
        .map(|nodes| nodes.into_iter().map(NodeRecord::from).collect())
        .ok_or_else(|| "node.list response has no nodes".to_string())
}

/// Map a `node.pair.list` payload, keeping only approved pairings
fn paired_records(value: Value) -> Result<Vec<NodeRecord>> {
    let response: PairListResponse = serde_json::from_value(value)?;
    Ok(response.paired.into_iter().map(NodeRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_records_require_nodes() {
        assert!(live_records(serde_json::json!({ "ts": 1 })).is_err());
        assert!(live_records(serde_json::json!([])).is_err());

        let nodes = live_records(serde_json::json!({
            "nodes": [{ "nodeId": "mac-1", "platform": "macos", "caps": ["canvas"], "connected": true }]
        }))
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].platform.as_deref(), Some("macos"));
    }

    #[test]
    fn paired_records_skip_pending() {
        let nodes = paired_records(serde_json::json!({
            "pending": [{ "requestId": "r1", "nodeId": "new-node" }],
            "paired": [{ "nodeId": "pc-7", "displayName": "Desk", "remoteIp": "10.0.0.7" }]
        }))
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].node_id, "pc-7");
        assert!(nodes[0].caps.is_none());
    }
}
