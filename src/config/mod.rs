//! Configuration management for Beacon node commands

pub mod file;

use std::time::Duration;

use crate::canvas::CANVAS_CAPABILITY;
use crate::{Error, Result};

use file::NodesConfigFile;

/// Gateway URL used when nothing else is configured
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:18789";

/// Per-call gateway timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Node command configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gateway connection settings
    pub gateway: GatewayConfig,

    /// Capability required for default node selection
    pub capability: String,
}

/// Gateway connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Gateway base URL
    pub url: String,

    /// Bearer token (from `BEACON_GATEWAY_TOKEN` env)
    pub token: Option<String>,

    /// Per-call timeout
    pub timeout: Duration,
}

/// Values supplied on the command line, highest precedence
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from the environment and the TOML file
    ///
    /// # Errors
    ///
    /// Returns error if an environment value is malformed
    pub fn load(overrides: Overrides) -> Result<Self> {
        // env > toml > default
        let fc = file::load_config_file();
        Self::from_sources(&fc, |key| std::env::var(key).ok(), overrides)
    }

    /// Build configuration from explicit sources
    ///
    /// Precedence: overrides > environment > file > defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a timeout is malformed or zero, or the URL is not http(s)
    pub fn from_sources(
        fc: &NodesConfigFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: Overrides,
    ) -> Result<Self> {
        let url = overrides
            .url
            .or_else(|| env("BEACON_GATEWAY_URL"))
            .or_else(|| fc.gateway.url.clone())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "gateway url must start with http:// or https://: {url}"
            )));
        }

        let token = overrides
            .token
            .or_else(|| env("BEACON_GATEWAY_TOKEN"))
            .or_else(|| fc.gateway.token.clone())
            .filter(|t| !t.is_empty());

        let env_timeout = env("BEACON_GATEWAY_TIMEOUT_MS")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    Error::Config(format!("invalid BEACON_GATEWAY_TIMEOUT_MS '{raw}': {e}"))
                })
            })
            .transpose()?;

        let timeout_ms = overrides
            .timeout_ms
            .or(env_timeout)
            .or(fc.gateway.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        if timeout_ms == 0 {
            return Err(Error::Config("gateway timeout must be positive".to_string()));
        }

        let capability = fc
            .canvas
            .capability
            .clone()
            .unwrap_or_else(|| CANVAS_CAPABILITY.to_string());

        Ok(Self {
            gateway: GatewayConfig {
                url,
                token,
                timeout: Duration::from_millis(timeout_ms),
            },
            capability,
        })
    }
}
