//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use catchment_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when --config is absent
pub const DEFAULT_CONFIG_FILE: &str = "catchment.toml";

/// Resolve which configuration file applies, if any
pub fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.is_file().then_some(local)
        }
    }
}

/// Load layered configuration: defaults, file, environment, then CLI flags
pub fn load_config(explicit: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file(explicit) {
        tracing::debug!("Loading configuration from {}", path.display());
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}
