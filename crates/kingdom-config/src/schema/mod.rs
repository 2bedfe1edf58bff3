//! Configuration schema types for Kingdom.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod presence;
mod realtime;
mod records;
mod sequencer;
mod system;

pub use presence::*;
pub use realtime::*;
pub use records::*;
pub use sequencer::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Kingdom.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct KingdomConfig {
    pub presence: PresenceConfig,
    pub realtime: RealtimeSettings,
    pub sequencer: SequencerConfig,
    pub records: RecordsConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_presence_matches_observed_constants() {
        let config = KingdomConfig::default();
        assert!(config.presence.enabled);
        assert_eq!(config.presence.collection, "activeCountries");
        assert_eq!(config.presence.ttl_secs, 300);
        assert_eq!(config.presence.sweep_interval_secs, 30);
    }

    #[test]
    fn default_sequencer() {
        let config = KingdomConfig::default();
        assert_eq!(config.sequencer.transition_delay_ms, 300);
        assert_eq!(config.sequencer.restart_policy, RestartPolicy::Preserve);
        assert!(config.sequencer.shuffle_seed.is_none());
    }

    #[test]
    fn default_records() {
        let config = KingdomConfig::default();
        assert_eq!(
            config.records.path,
            std::path::PathBuf::from("data/prayerData.json")
        );
        assert_eq!(config.records.fallback_image, "worldmap.png");
    }

    #[test]
    fn default_realtime_is_unconfigured() {
        let config = KingdomConfig::default();
        assert!(!config.realtime.is_configured());
        assert_eq!(config.realtime.heartbeat_interval, 25);
    }

    #[test]
    fn realtime_debug_redacts_api_key() {
        let settings = RealtimeSettings {
            project_ref: "abc".into(),
            api_key: "secret-anon-key".into(),
            ..Default::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("secret-anon-key"));
        assert!(debug.contains("[REDACTED]"));
        assert!(settings.is_configured());
    }

    #[test]
    fn restart_policy_deserializes_lowercase() {
        let config: KingdomConfig = toml::from_str(
            r#"
[sequencer]
restart_policy = "reshuffle"
shuffle_seed = 7
"#,
        )
        .unwrap();
        assert_eq!(config.sequencer.restart_policy, RestartPolicy::Reshuffle);
        assert_eq!(config.sequencer.shuffle_seed, Some(7));
    }

    #[test]
    fn log_level_directive() {
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
        assert_eq!(LogLevel::Warning.as_directive(), "warn");
        let config: KingdomConfig = toml::from_str("[logging]\nlevel = \"ERROR\"\n").unwrap();
        assert_eq!(config.logging.level, LogLevel::Error);
    }
}
