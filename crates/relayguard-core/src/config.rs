//! Guard configuration.
//!
//! Loads and validates `config.yaml` files into Rust types.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default bound on nested `execTransaction` calls.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 3;

/// Default timeout for a single Safe lookup.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Errors from loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How a declared Safe version that the registry does not know is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionPolicy {
    /// Use the latest version deployed on the chain.
    #[default]
    FallbackToLatest,
    /// Reject the request.
    Strict,
}

/// Parsed guard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// Maximum number of nested `execTransaction` calls unwound per request.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
    /// Unknown-version handling.
    #[serde(default)]
    pub version_policy: VersionPolicy,
    /// Deployment dataset to load instead of the embedded one.
    #[serde(default)]
    pub deployments_path: Option<PathBuf>,
    /// JSON-RPC endpoints used for Safe lookups, keyed by chain id.
    #[serde(default)]
    pub chain_rpc_urls: HashMap<u64, String>,
    /// Timeout for a single Safe lookup, in seconds.
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

fn default_lookup_timeout_secs() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            version_policy: VersionPolicy::default(),
            deployments_path: None,
            chain_rpc_urls: HashMap::new(),
            lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
        }
    }
}

impl GuardConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    ///
    /// A relative `deployments_path` is resolved against the config file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;
        if let (Some(deployments), Some(dir)) = (&config.deployments_path, path.parent()) {
            if deployments.is_relative() {
                config.deployments_path = Some(dir.join(deployments));
            }
        }
        Ok(config)
    }

    /// Timeout applied to each Safe lookup.
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_nesting_depth must be at least 1".into(),
            ));
        }
        if self.lookup_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "lookup_timeout_secs must be greater than 0".into(),
            ));
        }
        for (chain_id, url) in &self.chain_rpc_urls {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "empty RPC URL for chain {chain_id}"
                )));
            }
        }
        Ok(())
    }
}
