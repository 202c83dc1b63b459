//! CLI subcommand implementations.

use std::path::{Path, PathBuf};

use relayguard_core::GuardConfig;
use relayguard_evm::DeploymentRegistry;

pub mod check;
pub mod deployments;

/// Resolve the config path (default: ~/.relayguard/config.yaml).
pub(crate) fn resolve_config_path(
    config: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = config {
        return Ok(path);
    }

    let home = dirs::home_dir().ok_or("could not determine home directory")?;
    Ok(home.join(".relayguard").join("config.yaml"))
}

/// Load the config and the deployment registry it points at.
///
/// An explicit `--config` must exist; the default path is optional.
pub(crate) fn load(
    config: Option<PathBuf>,
) -> Result<(GuardConfig, DeploymentRegistry), Box<dyn std::error::Error>> {
    let explicit = config.is_some();
    let config_path = resolve_config_path(config)?;

    let config = if explicit || config_path.exists() {
        tracing::info!("loading config from {}", config_path.display());
        GuardConfig::from_file(&config_path)?
    } else {
        tracing::debug!("no config at {}, using defaults", config_path.display());
        GuardConfig::default()
    };

    let registry = load_registry(config.deployments_path.as_deref())?;
    Ok((config, registry))
}

fn load_registry(path: Option<&Path>) -> Result<DeploymentRegistry, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            tracing::info!("loading deployments from {}", path.display());
            Ok(DeploymentRegistry::from_file(path)?)
        }
        None => Ok(DeploymentRegistry::embedded()?),
    }
}
