//! Wire shape of a presence entry.
//!
//! Each client stores one entry at `{collection}/{client_id}`:
//! `{ "country": "Kenya", "timestamp": 1718000000000 }`. Transport
//! bookkeeping fields (e.g. Phoenix `phx_ref`) may ride alongside and are
//! ignored here.

use serde::{Deserialize, Serialize};

/// Default collection name for presence entries.
pub const DEFAULT_COLLECTION: &str = "activeCountries";

/// One client's declaration of the country it is viewing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    #[serde(rename = "country")]
    pub selected_country: String,
    /// Epoch milliseconds of the write.
    pub timestamp: i64,
}

impl PresenceEntry {
    pub fn new(selected_country: impl Into<String>, timestamp: i64) -> Self {
        Self {
            selected_country: selected_country.into(),
            timestamp,
        }
    }

    /// Parse a raw store value. Malformed values yield `None`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let country = value.get("country")?.as_str()?;
        let timestamp = value.get("timestamp")?;
        // JS clients may send the timestamp as a float.
        let timestamp = timestamp
            .as_i64()
            .or_else(|| timestamp.as_f64().map(|f| f as i64))?;
        Some(Self::new(country, timestamp))
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "country": self.selected_country,
            "timestamp": self.timestamp,
        })
    }
}
