//! Gateway RPC seam
//!
//! Every node interaction goes through a single request/response call on the
//! gateway. The transport behind it is swappable so the resolver and
//! dispatcher can be exercised without a live gateway.

mod http;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpGatewayClient;

use crate::Result;

/// Live node listing
pub const METHOD_NODE_LIST: &str = "node.list";

/// Pairing listing, used when the live listing is unavailable
pub const METHOD_NODE_PAIR_LIST: &str = "node.pair.list";

/// Command invocation on a single node
pub const METHOD_NODE_INVOKE: &str = "node.invoke";

/// Request/response access to the gateway
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Call `method` with `params`, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails or the gateway rejects the call
    async fn call(&self, method: &str, params: Option<Value>, timeout: Duration) -> Result<Value>;
}
