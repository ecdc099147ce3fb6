use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const CONFIG_HEADER: &str = "# Example configuration file for xrate\n\
# Rates are requested for base_currency from provider.base_url every\n\
# refresh_interval_secs seconds.\n";

/// Creates a default configuration file at the default location
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(path)
}

/// Creates a default configuration file at the specified path
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let body = serde_yaml::to_string(&AppConfig::default())
        .context("Failed to serialize default configuration")?;
    let default_config = format!("{CONFIG_HEADER}{body}");

    std::fs::write(path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
