pub mod clock;
pub mod identity;
pub mod presence;
pub mod protocol;
pub mod realtime;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::{ProfileStorage, SessionIdentity, IDENTITY_KEY};
pub use presence::{compute_view, PresenceAggregator, PresencePolicy, PresencePublisher, PresenceView};
pub use protocol::{PresenceEntry, DEFAULT_COLLECTION};
pub use realtime::{RealtimeClient, RealtimeConfig};
pub use store::{MemoryStore, RealtimeStore, SharedStore, Snapshot, StorePath, Subscription};
