//! Writes this client's selection to the shared store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kingdom_common::ClientId;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::protocol::PresenceEntry;
use crate::store::{SharedStore, StorePath};

/// Publishes `{country, timestamp}` under `{collection}/{client_id}`.
///
/// Every operation is fire-and-forget: store failures are logged and the
/// presenter carries on. A publisher dropped while its entry is still live
/// schedules a best-effort delete on the current runtime.
pub struct PresencePublisher {
    store: Arc<dyn SharedStore>,
    path: StorePath,
    clock: Arc<dyn Clock>,
    published: AtomicBool,
}

impl PresencePublisher {
    pub fn new(
        store: Arc<dyn SharedStore>,
        collection: &str,
        client_id: &ClientId,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            path: StorePath::new(collection, client_id.as_str()),
            clock,
            published: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Announce the country currently on screen. Blank countries are skipped.
    pub async fn publish(&self, country: &str) {
        let country = country.trim();
        if country.is_empty() {
            debug!(path = %self.path, "Skipping presence publish for blank country");
            return;
        }

        let entry = PresenceEntry::new(country, self.clock.now_millis());
        match self.store.write(&self.path, entry.to_value()).await {
            Ok(()) => {
                self.published.store(true, Ordering::SeqCst);
                debug!(path = %self.path, country = %country, "Presence published");
            }
            Err(e) => warn!(path = %self.path, error = %e, "Presence publish failed"),
        }
    }

    /// Remove this client's entry. Safe to call repeatedly.
    pub async fn retract(&self) {
        self.published.store(false, Ordering::SeqCst);
        match self.store.delete(&self.path).await {
            Ok(()) => debug!(path = %self.path, "Presence retracted"),
            Err(e) => warn!(path = %self.path, error = %e, "Presence retract failed"),
        }
    }

    pub fn is_published(&self) -> bool {
        self.published.load(Ordering::SeqCst)
    }
}

impl Drop for PresencePublisher {
    fn drop(&mut self) {
        if !self.published.swap(false, Ordering::SeqCst) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(path = %self.path, "No runtime at drop; entry left to expire");
            return;
        };
        let store = Arc::clone(&self.store);
        let path = self.path.clone();
        handle.spawn(async move {
            if let Err(e) = store.delete(&path).await {
                debug!(path = %path, error = %e, "Best-effort presence delete failed");
            }
        });
    }
}
