//! Node directory and resolution
//!
//! Nodes are remote devices reachable through the gateway. Every command
//! resolves its target against a fresh directory snapshot.

pub mod directory;
pub mod resolver;
pub mod types;

pub use directory::fetch_directory;
pub use resolver::{MIN_ID_PREFIX_LEN, normalize_node_key, resolve_node};
pub use types::{InvokeRequest, NodeRecord};
