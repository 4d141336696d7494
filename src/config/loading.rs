//! Configuration loading functionality.
//!
//! Resolves the config path, creates the default file on first run, parses
//! and validates.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;

const CONFIG_FILE_NAME: &str = "duskr.toml";

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Get the configuration file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("duskr").join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load the configuration for this process, creating the default file if needed.
    pub fn load() -> Result<Self> {
        load()
    }
}

/// Load configuration using automatic path detection.
///
/// Creates a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Load configuration from a specific path.
///
/// This version does NOT create a default config if the path doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    validate_config(&config)?;
    apply_modifications(&mut config);

    Ok(config)
}

/// Normalise values that validation accepts but the rest of the program
/// should not have to re-check.
fn apply_modifications(config: &mut Config) {
    if let Some(location) = config.location.as_mut() {
        let trimmed = location.trim();
        if trimmed.len() != location.len() {
            *location = trimmed.to_string();
        }
    }

    // A lone coordinate is useless; fall back to geocoding the location name
    if config.latitude.is_some() != config.longitude.is_some() {
        log_pipe!();
        log_warning!("Only one of latitude/longitude is set; both are ignored");
        log_indented!("Geocoding '{}' instead", config.location());
        config.latitude = None;
        config.longitude = None;
    }

    if let Some(url) = config.geocoding_url.as_mut() {
        *url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = config.solar_url.as_mut() {
        *url = url.trim_end_matches('/').to_string();
    }
}
