//! Turns pushed store snapshots into a live view of other clients.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use kingdom_common::{ClientId, StoreError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::clock::Clock;
use crate::protocol::PresenceEntry;
use crate::store::{SharedStore, Snapshot};

use super::types::{PresencePolicy, PresenceView};

/// Filter a raw snapshot down to the fresh entries of other clients.
///
/// Malformed values and the local client are skipped. Nothing is written
/// back to the store; stale entries simply disappear from the view.
pub fn compute_view(
    snapshot: &Snapshot,
    local: &ClientId,
    now_millis: i64,
    policy: &PresencePolicy,
) -> PresenceView {
    let entries: BTreeMap<ClientId, PresenceEntry> = snapshot
        .iter()
        .filter(|(key, _)| key.as_str() != local.as_str())
        .filter_map(|(key, value)| {
            let entry = PresenceEntry::from_value(value);
            if entry.is_none() {
                trace!(key = %key, "Skipping malformed presence entry");
            }
            entry.map(|e| (ClientId::from(key.as_str()), e))
        })
        .filter(|(_, entry)| policy.is_fresh(entry.timestamp, now_millis))
        .collect();
    PresenceView::from_entries(entries)
}

/// Background task keeping a [`PresenceView`] current.
///
/// The view is recomputed on every snapshot push and on each sweep tick, so
/// entries age out even when nobody writes. Dropping the aggregator cancels
/// the task, which releases the store subscription.
pub struct PresenceAggregator {
    rx: watch::Receiver<PresenceView>,
    task: JoinHandle<()>,
}

impl PresenceAggregator {
    pub fn start(
        store: &dyn SharedStore,
        collection: &str,
        local: ClientId,
        policy: PresencePolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let mut subscription = store.subscribe_all(collection)?;
        let mut snapshot = subscription.current();
        let initial = compute_view(&snapshot, &local, clock.now_millis(), &policy);
        let (tx, rx) = watch::channel(initial);

        info!(
            collection = %collection,
            ttl_secs = policy.ttl.as_secs(),
            sweep_secs = policy.sweep_interval.as_secs(),
            "Presence aggregator started"
        );

        let task = tokio::spawn(async move {
            let period = policy.sweep_interval.max(Duration::from_millis(1));
            let mut sweep = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    next = subscription.changed() => match next {
                        Some(next) => snapshot = next,
                        None => {
                            debug!(collection = %subscription.collection(), "Store closed; aggregator stopping");
                            break;
                        }
                    },
                    _ = sweep.tick() => {}
                }

                let view = compute_view(&snapshot, &local, clock.now_millis(), &policy);
                tx.send_if_modified(|current| {
                    if *current == view {
                        false
                    } else {
                        debug!(others = view.len(), "Presence view changed");
                        *current = view;
                        true
                    }
                });
            }
        });

        Ok(Self { rx, task })
    }

    /// Current view.
    pub fn view(&self) -> PresenceView {
        self.rx.borrow().clone()
    }

    /// A fresh receiver for use in a `select!` loop.
    pub fn watch(&self) -> watch::Receiver<PresenceView> {
        self.rx.clone()
    }

    /// Wait for the view to change. `None` once the task has ended.
    pub async fn changed(&mut self) -> Option<PresenceView> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn stop(self) {}
}

impl Drop for PresenceAggregator {
    fn drop(&mut self) {
        self.task.abort();
    }
}
