//! Reading the config file, and writing the commented default on first run.

use std::path::{Path, PathBuf};

use kingdom_common::ConfigError;
use tracing::{info, warn};

use super::template::default_config_toml;
use crate::schema::KingdomConfig;
use crate::validation;

/// `<config dir>/kingdom/config.toml`, e.g. `~/.config/kingdom/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kingdom").join("config.toml"))
}

/// Write the commented default config, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_error = |what: &str, e: std::io::Error| {
        ConfigError::ParseError(format!("failed to {what} {}: {e}", path.display()))
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create directory for", e))?;
    }
    std::fs::write(path, default_config_toml()).map_err(|e| io_error("write", e))?;
    info!(path = %path.display(), "Created default config");
    Ok(())
}

/// Parse a TOML config file. Missing fields take their defaults.
///
/// Range problems are only logged here; callers that need a valid config
/// run [`validation::validate`] themselves.
pub fn load_from_path(path: &Path) -> Result<KingdomConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;
    let config: KingdomConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "Config has out-of-range values");
    }
    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Load the platform default config.
///
/// A missing file is created from the template. When there is no config
/// directory, or the template cannot be written, defaults are used.
pub fn load_default() -> Result<KingdomConfig, ConfigError> {
    let Some(path) = default_config_path() else {
        warn!("No platform config directory; using defaults");
        return Ok(KingdomConfig::default());
    };

    if path.exists() {
        return load_from_path(&path);
    }

    if let Err(e) = create_default_config(&path) {
        warn!(error = %e, "Could not write default config; using defaults");
    }
    Ok(KingdomConfig::default())
}
