//! Translating server frames into [`RealtimeEvent`]s.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::types::{PhoenixMessage, RealtimeEvent};

/// Presence key to its metas, as carried by `presence_state` and `presence_diff`.
pub type PresenceMap = HashMap<String, Vec<serde_json::Value>>;

fn strip_topic_prefix(topic: &str) -> &str {
    topic.strip_prefix("realtime:").unwrap_or(topic)
}

/// Parse `{ key: { "metas": [...] } }`. Keys without a metas array are skipped,
/// and anything that is not an object yields an empty map.
pub fn parse_presence_map(value: &serde_json::Value) -> PresenceMap {
    let Some(entries) = value.as_object() else {
        return PresenceMap::new();
    };
    entries
        .iter()
        .filter_map(|(key, entry)| {
            let metas = entry.get("metas")?.as_array()?;
            Some((key.clone(), metas.clone()))
        })
        .collect()
}

pub(crate) async fn handle_phoenix_message(
    msg: &PhoenixMessage,
    pending_joins: &mut HashSet<String>,
    event_tx: &mpsc::Sender<RealtimeEvent>,
) {
    let Some(event) = translate(msg, pending_joins) else {
        return;
    };
    if event_tx.send(event).await.is_err() {
        debug!("Realtime event receiver dropped");
    }
}

/// `pending_joins` holds the refs of joins still awaiting a reply. Any other
/// ok reply acknowledges a presence push and produces no event.
fn translate(msg: &PhoenixMessage, pending_joins: &mut HashSet<String>) -> Option<RealtimeEvent> {
    let topic = strip_topic_prefix(&msg.topic).to_string();
    let payload = &msg.payload;

    let event = match msg.event.as_str() {
        // Heartbeat acks.
        "phx_reply" if topic == "phoenix" => return None,
        "phx_reply" => {
            let is_join = msg
                .msg_ref
                .as_ref()
                .is_some_and(|msg_ref| pending_joins.remove(msg_ref));
            match payload.get("status")?.as_str()? {
                "ok" if is_join => RealtimeEvent::ChannelJoined { topic },
                "ok" => {
                    debug!(topic = %topic, msg_ref = ?msg.msg_ref, "Push acknowledged");
                    return None;
                }
                status => {
                    let message = payload["response"]["reason"]
                        .as_str()
                        .unwrap_or(status)
                        .to_string();
                    warn!(topic = %topic, status = %status, reason = %message, "Channel push rejected");
                    RealtimeEvent::ChannelError { topic, message }
                }
            }
        }
        "phx_error" | "phx_close" => {
            let message = if msg.event == "phx_error" {
                "channel error"
            } else {
                "channel closed"
            };
            warn!(topic = %topic, "Realtime {message}");
            RealtimeEvent::ChannelError {
                topic,
                message: message.to_string(),
            }
        }
        "presence_state" => {
            let state = parse_presence_map(payload);
            debug!(topic = %topic, keys = state.len(), "Presence state");
            RealtimeEvent::PresenceState { topic, state }
        }
        "presence_diff" => {
            let joins = parse_presence_map(&payload["joins"]);
            let leaves = parse_presence_map(&payload["leaves"]);
            debug!(topic = %topic, joins = joins.len(), leaves = leaves.len(), "Presence diff");
            RealtimeEvent::PresenceDiff {
                topic,
                joins,
                leaves,
            }
        }
        other => {
            debug!(topic = %topic, event = %other, "Ignoring Phoenix event");
            return None;
        }
    };
    Some(event)
}
