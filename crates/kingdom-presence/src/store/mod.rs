//! Shared real-time key/value store boundary.
//!
//! A store holds collections of JSON values keyed by client. Every mutation
//! of a collection pushes the full collection to its subscribers.

mod memory;
mod realtime;

pub use memory::MemoryStore;
pub use realtime::RealtimeStore;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use kingdom_common::StoreError;
use tokio::sync::watch;
use tracing::debug;

/// Full contents of one collection, keyed by entry key.
pub type Snapshot = BTreeMap<String, serde_json::Value>;

/// `collection/key` address of a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    pub collection: String,
    pub key: String,
}

impl StorePath {
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Parse `collection/key`. Both segments must be non-empty and the key
    /// may not contain further separators.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let (collection, key) = path
            .split_once('/')
            .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        if collection.is_empty() || key.is_empty() || key.contains('/') {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(Self::new(collection, key))
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// A real-time key/value service.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Create or overwrite the entry at `path`.
    async fn write(&self, path: &StorePath, value: serde_json::Value) -> Result<(), StoreError>;

    /// Remove the entry at `path`. Removing a missing entry is not an error.
    async fn delete(&self, path: &StorePath) -> Result<(), StoreError>;

    /// Listen to every change of `collection`.
    fn subscribe_all(&self, collection: &str) -> Result<Subscription, StoreError>;
}

/// Live listener on one collection.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// releases the listener.
pub struct Subscription {
    collection: String,
    rx: watch::Receiver<Snapshot>,
}

impl Subscription {
    pub(crate) fn new(collection: &str, rx: watch::Receiver<Snapshot>) -> Self {
        debug!(collection = %collection, "Subscribed");
        Self {
            collection: collection.to_string(),
            rx,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Latest snapshot, without waiting.
    pub fn current(&mut self) -> Snapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next pushed snapshot. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(collection = %self.collection, "Unsubscribed");
    }
}
