//! Node directory types

use serde::{Deserialize, Serialize};

/// Canonical node record used by the resolver
///
/// Built fresh from whichever upstream listing answered; never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub node_id: String,
    pub display_name: Option<String>,
    pub platform: Option<String>,
    pub remote_ip: Option<String>,
    /// `None` means unknown, which counts as capable
    pub caps: Option<Vec<String>>,
    /// `None` means unknown
    pub connected: Option<bool>,
}

impl NodeRecord {
    /// Human label: display name, else remote address, else id
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.remote_ip.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.node_id)
    }

    /// Whether the node advertises `capability` (unknown counts as yes)
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.caps
            .as_ref()
            .is_none_or(|caps| caps.iter().any(|c| c == capability))
    }

    /// Whether the node is known to be connected
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected == Some(true)
    }
}

/// Entry of a `node.list` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveNode {
    pub node_id: String,
    pub display_name: Option<String>,
    pub platform: Option<String>,
    pub remote_ip: Option<String>,
    #[serde(alias = "capabilities")]
    pub caps: Option<Vec<String>>,
    pub connected: Option<bool>,
}

impl From<LiveNode> for NodeRecord {
    fn from(node: LiveNode) -> Self {
        Self {
            node_id: node.node_id,
            display_name: node.display_name,
            platform: node.platform,
            remote_ip: node.remote_ip,
            caps: node.caps,
            connected: node.connected,
        }
    }
}

/// `node.list` response; `nodes` absent means the listing is unusable
#[derive(Debug, Clone, Deserialize)]
pub struct NodeListResponse {
    pub nodes: Option<Vec<LiveNode>>,
}

/// Approved entry of a `node.pair.list` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedNode {
    pub node_id: String,
    pub display_name: Option<String>,
    pub remote_ip: Option<String>,
}

impl From<PairedNode> for NodeRecord {
    fn from(node: PairedNode) -> Self {
        Self {
            node_id: node.node_id,
            display_name: node.display_name,
            remote_ip: node.remote_ip,
            ..Self::default()
        }
    }
}

/// `node.pair.list` response; pending requests are ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairListResponse {
    #[serde(default)]
    pub paired: Vec<PairedNode>,
}

/// Params of a `node.invoke` gateway call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub node_id: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    pub idempotency_key: String,
}
