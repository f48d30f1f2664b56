use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, ScoringConfig};

/// Write a config file populated with the default thresholds.
///
/// Refuses to overwrite an existing file unless `force` is set. Returns the
/// path the config was written to.
pub fn write_sample_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config {
        store: None,
        scoring: Some(ScoringConfig::default()),
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}
