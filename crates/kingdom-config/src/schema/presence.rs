//! Presence configuration types.

use serde::{Deserialize, Serialize};

/// Presence publishing and aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub enabled: bool,
    /// Collection (store path prefix) holding one entry per client.
    pub collection: String,
    /// Entries older than this are treated as absent (valid range: 10-86400).
    pub ttl_secs: u32,
    /// How often the aggregator re-filters the last snapshot (valid range: 1-3600).
    pub sweep_interval_secs: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collection: "activeCountries".into(),
            ttl_secs: 300,
            sweep_interval_secs: 30,
        }
    }
}
