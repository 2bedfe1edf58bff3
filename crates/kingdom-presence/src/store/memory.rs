//! In-process store: one watch channel per collection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use kingdom_common::StoreError;
use tokio::sync::watch;
use tracing::debug;

use super::{SharedStore, Snapshot, StorePath, Subscription};

struct Collection {
    entries: Snapshot,
    tx: watch::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot::new());
        Self {
            entries: Snapshot::new(),
            tx,
        }
    }

    fn push(&self) {
        self.tx.send_replace(self.entries.clone());
    }
}

/// Shared store living in this process.
///
/// Cloning yields another handle to the same data, so several simulated
/// clients can share one store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, Collection>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Collection>> {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulate a dropped channel: writes and deletes fail until restored.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    /// Current contents of a collection.
    pub fn snapshot(&self, collection: &str) -> Snapshot {
        self.lock()
            .get(collection)
            .map(|c| c.entries.clone())
            .unwrap_or_default()
    }

    /// Number of live subscriptions on a collection.
    pub fn listener_count(&self, collection: &str) -> usize {
        self.lock()
            .get(collection)
            .map(|c| c.tx.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn write(&self, path: &StorePath, value: serde_json::Value) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.lock();
        let collection = collections
            .entry(path.collection.clone())
            .or_insert_with(Collection::new);
        collection.entries.insert(path.key.clone(), value);
        collection.push();
        debug!(path = %path, "Memory store write");
        Ok(())
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.lock();
        if let Some(collection) = collections.get_mut(&path.collection) {
            if collection.entries.remove(&path.key).is_some() {
                collection.push();
                debug!(path = %path, "Memory store delete");
            }
        }
        Ok(())
    }

    fn subscribe_all(&self, collection: &str) -> Result<Subscription, StoreError> {
        let mut collections = self.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        Ok(Subscription::new(collection, entry.tx.subscribe()))
    }
}
