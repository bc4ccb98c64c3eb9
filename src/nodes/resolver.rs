//! Node resolution from a free-form query
//!
//! A query may be a node id, a remote address, a display name in any
//! casing/punctuation, or an id prefix of at least six characters. With no
//! query, the single connected node carrying the capability is chosen.

use crate::{Error, Result};

use super::types::NodeRecord;

/// Shortest query that may match as an id prefix
pub const MIN_ID_PREFIX_LEN: usize = 6;

/// Platform prefix of the local machine used to break default ties
const LOCAL_PLATFORM_PREFIX: &str = "mac";

/// Id prefix of nodes hosted on the local machine
const LOCAL_ID_PREFIX: &str = "mac-";

/// Collapse a name to its comparison key
///
/// Lower-cases, turns runs of non-alphanumerics into one `-`, and trims
/// leading and trailing separators.
#[must_use]
pub fn normalize_node_key(value: &str) -> String {
    let mut key = String::with_capacity(value.len());
    let mut pending_sep = false;

    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !key.is_empty() {
                key.push('-');
            }
            pending_sep = false;
            key.push(ch);
        } else {
            pending_sep = true;
        }
    }

    key
}

/// Pick exactly one node id for `query` from a directory snapshot
///
/// # Errors
///
/// Returns `NoCapableNode` or `AmbiguousDefault` when no query is given and
/// the default cannot be chosen, `UnknownNode` or `AmbiguousNode` when an
/// explicit query matches zero or several nodes
pub fn resolve_node(query: Option<&str>, nodes: &[NodeRecord], capability: &str) -> Result<String> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => resolve_query(q, nodes),
        None => resolve_default(nodes, capability),
    }
}

fn resolve_default(nodes: &[NodeRecord], capability: &str) -> Result<String> {
    let capable: Vec<&NodeRecord> = nodes
        .iter()
        .filter(|n| n.has_capability(capability))
        .collect();
    if capable.is_empty() {
        return Err(Error::NoCapableNode {
            capability: capability.to_string(),
        });
    }

    let connected: Vec<&NodeRecord> = capable.iter().copied().filter(|n| n.is_connected()).collect();
    let candidates = if connected.is_empty() { capable } else { connected };

    if let [only] = candidates.as_slice() {
        return Ok(only.node_id.clone());
    }

    let local: Vec<&NodeRecord> = candidates.into_iter().filter(|n| is_local(n)).collect();
    if let [only] = local.as_slice() {
        tracing::debug!(node_id = %only.node_id, "picked local node from several candidates");
        return Ok(only.node_id.clone());
    }

    Err(Error::AmbiguousDefault {
        capability: capability.to_string(),
    })
}

fn is_local(node: &NodeRecord) -> bool {
    node.platform
        .as_deref()
        .is_some_and(|p| p.to_lowercase().starts_with(LOCAL_PLATFORM_PREFIX))
        && node.node_id.starts_with(LOCAL_ID_PREFIX)
}

fn resolve_query(query: &str, nodes: &[NodeRecord]) -> Result<String> {
    let key = normalize_node_key(query);
    let matches: Vec<&NodeRecord> = nodes.iter().filter(|n| matches_query(n, query, &key)).collect();

    match matches.as_slice() {
        [only] => Ok(only.node_id.clone()),
        [] => Err(Error::UnknownNode {
            query: query.to_string(),
            known: nodes.iter().map(|n| n.label().to_string()).collect(),
        }),
        many => Err(Error::AmbiguousNode {
            query: query.to_string(),
            matches: many.iter().map(|n| n.label().to_string()).collect(),
        }),
    }
}

fn matches_query(node: &NodeRecord, query: &str, key: &str) -> bool {
    if node.node_id == query {
        return true;
    }
    if node.remote_ip.as_deref() == Some(query) {
        return true;
    }
    let name_matches = node
        .display_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .is_some_and(|name| normalize_node_key(name) == key);
    if name_matches {
        return true;
    }
    query.chars().count() >= MIN_ID_PREFIX_LEN && node.node_id.starts_with(query)
}
