//! Shared store backed by a Supabase Realtime presence channel.
//!
//! The collection is the channel topic and the client id is the presence
//! key, so a connection can only write its own entry. Presence state and
//! diffs from the server are folded into full snapshots.

use async_trait::async_trait;
use kingdom_common::{ClientId, StoreError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::protocol::PresenceEntry;
use crate::realtime::{ChannelConfig, PresenceMap, RealtimeClient, RealtimeConfig, RealtimeEvent};

use super::{SharedStore, Snapshot, StorePath, Subscription};

/// Fields the server adds to every presence meta.
const BOOKKEEPING_FIELDS: &[&str] = &["phx_ref", "phx_ref_prev"];

// ---------------------------------------------------------------------------
// Presence mirror
// ---------------------------------------------------------------------------

/// Local copy of a channel's presence state.
///
/// A key may carry several metas when more than one connection shares an
/// id; the newest timestamp wins in the snapshot.
#[derive(Debug, Default)]
pub(crate) struct PresenceMirror {
    metas: PresenceMap,
}

fn phx_ref(meta: &serde_json::Value) -> Option<&str> {
    meta.get("phx_ref").and_then(|r| r.as_str())
}

impl PresenceMirror {
    pub(crate) fn replace(&mut self, state: PresenceMap) {
        self.metas = state;
        self.metas.retain(|_, metas| !metas.is_empty());
    }

    /// Apply leaves before joins so an update (leave old + join new) lands.
    pub(crate) fn apply_diff(&mut self, joins: PresenceMap, leaves: PresenceMap) {
        for (key, left) in leaves {
            let Some(current) = self.metas.get_mut(&key) else {
                continue;
            };
            let refs: Vec<&str> = left.iter().filter_map(phx_ref).collect();
            if refs.is_empty() {
                current.clear();
            } else {
                current.retain(|meta| phx_ref(meta).map_or(true, |r| !refs.contains(&r)));
            }
            if current.is_empty() {
                self.metas.remove(&key);
            }
        }
        for (key, joined) in joins {
            self.metas.entry(key).or_default().extend(joined);
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.metas
            .iter()
            .filter_map(|(key, metas)| {
                let newest = metas.iter().max_by_key(|meta| {
                    PresenceEntry::from_value(meta).map_or(i64::MIN, |e| e.timestamp)
                })?;
                let mut value = newest.clone();
                if let Some(obj) = value.as_object_mut() {
                    for field in BOOKKEEPING_FIELDS {
                        obj.remove(*field);
                    }
                }
                Some((key.clone(), value))
            })
            .collect()
    }
}

async fn mirror_loop(
    mut events: mpsc::Receiver<RealtimeEvent>,
    topic: String,
    snapshots: watch::Sender<Snapshot>,
) {
    let mut mirror = PresenceMirror::default();
    while let Some(event) = events.recv().await {
        match event {
            RealtimeEvent::PresenceState { topic: t, state } if t == topic => {
                mirror.replace(state);
                snapshots.send_replace(mirror.snapshot());
            }
            RealtimeEvent::PresenceDiff {
                topic: t,
                joins,
                leaves,
            } if t == topic => {
                mirror.apply_diff(joins, leaves);
                snapshots.send_replace(mirror.snapshot());
            }
            RealtimeEvent::Connected => info!(topic = %topic, "Presence channel connected"),
            RealtimeEvent::ChannelJoined { topic: t } => debug!(topic = %t, "Joined presence channel"),
            RealtimeEvent::Disconnected => {
                warn!(topic = %topic, "Presence channel disconnected; view stalls until reconnect");
            }
            RealtimeEvent::ChannelError { topic: t, message } => {
                warn!(topic = %t, message = %message, "Presence channel error");
            }
            RealtimeEvent::Error(message) => warn!(message = %message, "Realtime error"),
            other => debug!(event = ?other, "Ignoring event for another topic"),
        }
    }
    debug!(topic = %topic, "Realtime event stream ended");
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// [`SharedStore`] over one Supabase Realtime presence channel.
pub struct RealtimeStore {
    client: RealtimeClient,
    topic: String,
    key: String,
    snapshots: watch::Sender<Snapshot>,
    mirror: JoinHandle<()>,
}

impl RealtimeStore {
    /// Connect and join `collection` with `client_id` as the presence key.
    pub async fn connect(
        config: RealtimeConfig,
        collection: &str,
        client_id: &ClientId,
    ) -> Result<Self, StoreError> {
        let (client, events) = RealtimeClient::connect(config);
        client
            .join_channel(collection, ChannelConfig::for_key(client_id.as_str()))
            .await?;

        let (snapshots, _) = watch::channel(Snapshot::new());
        let mirror = tokio::spawn(mirror_loop(
            events,
            collection.to_string(),
            snapshots.clone(),
        ));

        info!(collection = %collection, client = %client_id, "Realtime store ready");
        Ok(Self {
            client,
            topic: collection.to_string(),
            key: client_id.to_string(),
            snapshots,
            mirror,
        })
    }

    fn check_path(&self, path: &StorePath) -> Result<(), StoreError> {
        if path.collection != self.topic {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        if path.key != self.key {
            return Err(StoreError::ForeignKey {
                expected: self.key.clone(),
                actual: path.key.clone(),
            });
        }
        Ok(())
    }

    /// Leave the channel and close the socket.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.client.leave_channel(&self.topic).await?;
        self.client.disconnect().await
    }
}

impl Drop for RealtimeStore {
    fn drop(&mut self) {
        self.mirror.abort();
    }
}

#[async_trait]
impl SharedStore for RealtimeStore {
    async fn write(&self, path: &StorePath, value: serde_json::Value) -> Result<(), StoreError> {
        self.check_path(path)?;
        self.client.presence_track(&self.topic, value).await
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        self.check_path(path)?;
        self.client.presence_untrack(&self.topic).await
    }

    fn subscribe_all(&self, collection: &str) -> Result<Subscription, StoreError> {
        if collection != self.topic {
            return Err(StoreError::InvalidPath(collection.to_string()));
        }
        Ok(Subscription::new(collection, self.snapshots.subscribe()))
    }
}
