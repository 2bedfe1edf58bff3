use serde::{Deserialize, Serialize};

/// Connection settings for the hosted realtime presence channel.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeSettings {
    /// Supabase project reference. Empty means offline (in-process store).
    pub project_ref: String,
    /// Supabase anon key (publishable).
    pub api_key: String,
    pub heartbeat_interval: u32,
    pub reconnect_delay: u32,
    pub max_reconnect_delay: u32,
}

impl std::fmt::Debug for RealtimeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSettings")
            .field("project_ref", &self.project_ref)
            .field("api_key", &"[REDACTED]")
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("max_reconnect_delay", &self.max_reconnect_delay)
            .finish()
    }
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            project_ref: String::new(),
            api_key: String::new(),
            heartbeat_interval: 25,
            reconnect_delay: 1,
            max_reconnect_delay: 30,
        }
    }
}

impl RealtimeSettings {
    /// Whether enough is configured to reach a hosted channel.
    pub fn is_configured(&self) -> bool {
        !self.project_ref.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}
