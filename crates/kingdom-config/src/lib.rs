//! Kingdom configuration system.
//!
//! TOML-based configuration with validation. All sections use defaults
//! matching the observed behavior, so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kingdom_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("presence ttl: {}s", config.presence.ttl_secs);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    KingdomConfig, LogLevel, PresenceConfig, RealtimeSettings, RecordsConfig, RestartPolicy,
    SequencerConfig, CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use kingdom_common::ConfigError;

/// Load config from the platform default path, creating it if missing.
pub fn load_config() -> Result<KingdomConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load and validate config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<KingdomConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}
