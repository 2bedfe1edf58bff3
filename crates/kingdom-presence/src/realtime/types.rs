//! Configuration, protocol types, and event/command enums for the realtime client.

use serde::{Deserialize, Serialize};

use super::handler::PresenceMap;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to Supabase Realtime.
#[derive(Clone)]
pub struct RealtimeConfig {
    /// Supabase project reference (e.g., "ojmqzagktzkualzgpcbq").
    pub project_ref: String,
    /// Supabase anon key (publishable).
    pub api_key: String,
    /// Heartbeat interval in seconds (default: 25).
    pub heartbeat_interval_secs: u64,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
}

impl std::fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("project_ref", &self.project_ref)
            .field("api_key", &"[REDACTED]")
            .field("heartbeat_interval_secs", &self.heartbeat_interval_secs)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("max_reconnect_delay_secs", &self.max_reconnect_delay_secs)
            .finish()
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            project_ref: String::new(),
            api_key: String::new(),
            heartbeat_interval_secs: 25,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
        }
    }
}

impl RealtimeConfig {
    /// Build the WebSocket URL for Supabase Realtime.
    pub(crate) fn ws_url(&self) -> String {
        format!(
            "wss://{}.supabase.co/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.project_ref, self.api_key
        )
    }

    /// Delay after `current`, doubling up to the configured ceiling.
    pub(crate) fn next_backoff(&self, current: u64) -> u64 {
        (current.saturating_mul(2)).min(self.max_reconnect_delay_secs.max(1))
    }
}

// ---------------------------------------------------------------------------
// Phoenix Protocol Types
// ---------------------------------------------------------------------------

/// A Phoenix protocol message envelope (v1 JSON format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    pub payload: serde_json::Value,
    #[serde(rename = "ref")]
    pub msg_ref: Option<String>,
}

impl PhoenixMessage {
    /// Frame addressed to a `realtime:` channel topic.
    pub(crate) fn channel(
        topic: &str,
        event: &str,
        payload: serde_json::Value,
        msg_ref: String,
    ) -> Self {
        Self {
            topic: format!("realtime:{topic}"),
            event: event.to_string(),
            payload,
            msg_ref: Some(msg_ref),
        }
    }

    pub(crate) fn join(topic: &str, config: &ChannelConfig, msg_ref: String) -> Self {
        Self::channel(topic, "phx_join", config.to_join_payload(), msg_ref)
    }

    pub(crate) fn leave(topic: &str, msg_ref: String) -> Self {
        Self::channel(topic, "phx_leave", serde_json::json!({}), msg_ref)
    }

    fn presence(topic: &str, body: serde_json::Value, msg_ref: String) -> Self {
        Self::channel(topic, "presence", body, msg_ref)
    }

    /// Publish (or replace) this connection's presence payload.
    pub(crate) fn track(topic: &str, payload: serde_json::Value, msg_ref: String) -> Self {
        Self::presence(
            topic,
            serde_json::json!({ "type": "presence", "event": "track", "payload": payload }),
            msg_ref,
        )
    }

    pub(crate) fn untrack(topic: &str, msg_ref: String) -> Self {
        Self::presence(
            topic,
            serde_json::json!({ "type": "presence", "event": "untrack" }),
            msg_ref,
        )
    }

    pub(crate) fn heartbeat(msg_ref: String) -> Self {
        Self {
            topic: "phoenix".to_string(),
            event: "heartbeat".to_string(),
            payload: serde_json::json!({}),
            msg_ref: Some(msg_ref),
        }
    }
}

// ---------------------------------------------------------------------------
// Channel Configuration
// ---------------------------------------------------------------------------

/// Configuration for a Supabase Realtime channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub presence: PresenceKeyConfig,
}

/// Presence configuration for a channel.
#[derive(Debug, Clone)]
pub struct PresenceKeyConfig {
    /// The key used to identify this client in presence state.
    pub key: String,
}

impl ChannelConfig {
    pub fn for_key(key: &str) -> Self {
        Self {
            presence: PresenceKeyConfig {
                key: key.to_string(),
            },
        }
    }

    /// Serialize to the JSON payload expected by Supabase phx_join.
    pub(crate) fn to_join_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "config": {
                "broadcast": {
                    "self": false,
                    "ack": false
                },
                "presence": {
                    "key": self.presence.key
                }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Events & Commands
// ---------------------------------------------------------------------------

/// Events emitted by the realtime client.
#[derive(Debug, Clone)]
pub enum RealtimeEvent {
    /// WebSocket connection established.
    Connected,
    /// WebSocket connection lost.
    Disconnected,
    /// Successfully joined a channel.
    ChannelJoined { topic: String },
    /// Channel closed or errored.
    ChannelError { topic: String, message: String },
    /// Full presence state, sent after every join.
    PresenceState { topic: String, state: PresenceMap },
    /// Presence changes since the last state or diff.
    PresenceDiff {
        topic: String,
        joins: PresenceMap,
        leaves: PresenceMap,
    },
    /// Error.
    Error(String),
}

/// Commands sent to the realtime client from the application layer.
#[derive(Debug)]
pub(crate) enum RealtimeCommand {
    JoinChannel {
        topic: String,
        config: ChannelConfig,
    },
    LeaveChannel {
        topic: String,
    },
    PresenceTrack {
        topic: String,
        payload: serde_json::Value,
    },
    PresenceUntrack {
        topic: String,
    },
    Disconnect,
}
