//! Error types for Beacon node commands

use thiserror::Error;

use crate::canvas::a2ui::{StreamErrors, UiVersion};

/// Result type alias for node command operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving nodes and dispatching commands
#[derive(Debug, Error)]
pub enum Error {
    /// No node in the directory advertises the required capability
    #[error("no connected {capability}-capable node")]
    NoCapableNode { capability: String },

    /// Default selection found several equally valid nodes
    #[error("multiple {capability}-capable nodes connected; pass --node to choose one")]
    AmbiguousDefault { capability: String },

    /// Explicit query matched no node
    #[error("unknown node: {query}{}", known_suffix(.known))]
    UnknownNode { query: String, known: Vec<String> },

    /// Explicit query matched more than one node
    #[error("ambiguous node: {query} (matches: {})", .matches.join(", "))]
    AmbiguousNode { query: String, matches: Vec<String> },

    /// Both the live node list and the pairing list failed
    #[error("failed to fetch node directory: {primary}; fallback: {fallback}")]
    DirectoryFetch { primary: String, fallback: String },

    /// UI message stream failed validation
    #[error("{0}")]
    InvalidStream(StreamErrors),

    /// UI message stream is well formed but uses a version we cannot forward
    #[error("JSONL contains A2UI {0} messages (createSurface); only v0.8 is supported")]
    UnsupportedProtocolVersion(UiVersion),

    /// Gateway returned an error or an unusable response
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Snapshot payload could not be decoded
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn known_suffix(known: &[String]) -> String {
    if known.is_empty() {
        String::new()
    } else {
        format!(" (known: {})", known.join(", "))
    }
}

impl From<StreamErrors> for Error {
    fn from(errors: StreamErrors) -> Self {
        Self::InvalidStream(errors)
    }
}
