//! Staleness policy and the filtered presence view.

use std::collections::BTreeMap;
use std::time::Duration;

use kingdom_common::ClientId;

use crate::protocol::PresenceEntry;

/// How long entries stay live and how often the view is re-filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresencePolicy {
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for PresencePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl PresencePolicy {
    pub fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// An entry written at `timestamp` is live at `now_millis` unless it is
    /// strictly older than the TTL.
    pub fn is_fresh(&self, timestamp: i64, now_millis: i64) -> bool {
        timestamp >= now_millis.saturating_sub(self.ttl_millis())
    }
}

/// Live entries of every client except the local one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceView {
    entries: BTreeMap<ClientId, PresenceEntry>,
}

impl PresenceView {
    pub(crate) fn from_entries(entries: BTreeMap<ClientId, PresenceEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, client: &ClientId) -> Option<&PresenceEntry> {
        self.entries.get(client)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClientId, &PresenceEntry)> {
        self.entries.iter()
    }

    /// Selected country per client, in client order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.selected_country.as_str())
    }
}
