//! TOML configuration file loading
//!
//! Supports `~/.config/omni/beacon/nodes.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct NodesConfigFile {
    /// Gateway connection settings
    #[serde(default)]
    pub gateway: GatewayFileConfig,

    /// Canvas command settings
    #[serde(default)]
    pub canvas: CanvasFileConfig,
}

/// Gateway connection configuration
#[derive(Debug, Default, Deserialize)]
pub struct GatewayFileConfig {
    /// Gateway base URL (e.g. "http://127.0.0.1:18789")
    pub url: Option<String>,

    /// Bearer token
    pub token: Option<String>,

    /// Per-call timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Canvas command configuration
#[derive(Debug, Default, Deserialize)]
pub struct CanvasFileConfig {
    /// Capability a node must advertise for default selection
    pub capability: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `NodesConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> NodesConfigFile {
    config_file_path().map_or_else(NodesConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_from(path: &Path) -> NodesConfigFile {
    if !path.exists() {
        return NodesConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                NodesConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            NodesConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/beacon/nodes.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("beacon")
            .join("nodes.toml")
    })
}
