use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where prayer records and partner images are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    pub path: PathBuf,
    pub asset_dir: PathBuf,
    /// Image shown when a partner image is missing from `asset_dir`.
    pub fallback_image: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/prayerData.json"),
            asset_dir: PathBuf::from("public/partners"),
            fallback_image: "worldmap.png".into(),
        }
    }
}
