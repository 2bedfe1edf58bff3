//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod misc;


use crate::schema::KingdomConfig;
use kingdom_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &KingdomConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    misc::validate_presence(&mut errors, config);
    misc::validate_realtime(&mut errors, config);
    misc::validate_sequencer(&mut errors, config);
    misc::validate_records(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
