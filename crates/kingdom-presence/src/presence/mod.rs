//! Presence publishing and aggregation over a [`SharedStore`](crate::store::SharedStore).
//!
//! The publisher writes this client's selection under its own key; the
//! aggregator turns pushed snapshots into a filtered view of everyone else.

mod aggregator;
mod publisher;
mod types;

pub use aggregator::{compute_view, PresenceAggregator};
pub use publisher::PresencePublisher;
pub use types::{PresencePolicy, PresenceView};
