//! Country-name matching between map region labels and prayer records.
//!
//! Map data and record data spell countries differently ("Côte d'Ivoire"
//! vs "Ivory Coast", "USA" vs "United States of America", "Kenya East
//! Africa" vs "Kenya"). Everything here is pure and table-driven.

pub mod aliases;
pub mod highlight;
pub mod normalize;
pub mod regions;
pub mod resolver;

pub use highlight::{resolve_highlight, Highlight};
pub use normalize::normalize;
pub use regions::WORLD_REGIONS;
pub use resolver::{canonicalize, countries_match, CountryMatcher};
