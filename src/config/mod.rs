mod init;
mod schema;
mod validation;

pub use init::write_sample_config;
pub use schema::{Config, ScoringConfig};
pub use validation::validate_scoring;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/tender-radar/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("tender-radar")
}

/// Get the default config file path (~/.config/tender-radar/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Get the default store file path (~/.config/tender-radar/store.json)
pub fn get_store_path() -> PathBuf {
    get_config_dir().join("store.json")
}

/// Load configuration from a YAML file.
///
/// A missing file is not an error: every threshold has a default, so the
/// engine runs fine without a config. An unreadable or unparsable file is.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        return Ok(Config {
            store: None,
            scoring: None,
        });
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}
