//! # CLI Settings
//!
//! Optional TOML configuration for `vetx`. Every key has a default, so an
//! empty file (or no file) yields a usable testnet setup:
//!
//! ```toml
//! node_url = "https://testnet.vechain.org"
//! request_timeout_secs = 10
//!
//! [network]
//! name = "testnet"
//! chain_tag = 0x27
//! max_expiration = 720
//! ```
//!
//! Flags and `VETX_*` environment variables are applied on top via
//! [`CliConfig::apply_overrides`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use vetx_protocol::config::NetworkConfig;

const DEFAULT_NODE_URL: &str = "https://testnet.vechain.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown network {0:?} (expected mainnet or testnet)")]
    UnknownNetwork(String),
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub network: NetworkConfig,
    pub node_url: String,
    pub request_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::testnet(),
            node_url: DEFAULT_NODE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CliConfig {
    /// Loads `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies flag and environment overrides.
    ///
    /// A network name switches the chain identity (`name` and `chain_tag`)
    /// to that preset. Limits from the file, `max_expiration` and the gas
    /// schedule, are kept.
    pub fn apply_overrides(
        &mut self,
        network: Option<&str>,
        node_url: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(name) = network {
            let preset = NetworkConfig::from_name(name)
                .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))?;
            self.network.name = preset.name;
            self.network.chain_tag = preset.chain_tag;
        }
        if let Some(url) = node_url {
            self.node_url = url.trim_end_matches('/').to_string();
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
