pub mod errors;
pub mod id;
pub mod types;

pub use errors::{ConfigError, KingdomError, RecordError, StoreError};
pub use id::{new_id, ClientId};
pub use types::Color;

pub type Result<T> = std::result::Result<T, KingdomError>;
