//! Per-profile client identity.
//!
//! The id is generated once, persisted in a small JSON key/value file in
//! the user's data directory, and reused on every later start.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kingdom_common::{ClientId, KingdomError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Key under which the client id is stored.
pub const IDENTITY_KEY: &str = "prayer_client_id";

/// Local key/value storage for one profile.
#[derive(Debug, Clone)]
pub struct ProfileStorage {
    path: PathBuf,
}

impl ProfileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/kingdom/profile.json`, if the platform has a data dir.
    pub fn default_location() -> Option<Self> {
        dirs::data_local_dir().map(|dir| Self::new(dir.join("kingdom").join("profile.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring unreadable profile storage");
            BTreeMap::new()
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), KingdomError> {
        let mut all = self.read_all();
        all.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&all)
            .map_err(|e| KingdomError::Identity(format!("failed to encode profile: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// The identity this client publishes presence under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub client_id: ClientId,
}

impl SessionIdentity {
    pub fn generate() -> Self {
        Self {
            client_id: ClientId::new(),
        }
    }

    /// Reuse the stored id, or generate and store a new one.
    ///
    /// A failed write still yields a usable identity for this session; the
    /// next start simply generates another.
    pub fn load_or_create(storage: &ProfileStorage) -> Self {
        if let Some(existing) = storage.get(IDENTITY_KEY).filter(|s| !s.trim().is_empty()) {
            debug!(client = %existing, "Reusing stored client id");
            return Self {
                client_id: ClientId::from(existing),
            };
        }

        let identity = Self::generate();
        match storage.set(IDENTITY_KEY, identity.client_id.as_str()) {
            Ok(()) => info!(client = %identity.client_id, "Created client id"),
            Err(e) => warn!(
                path = %storage.path().display(),
                error = %e,
                "Failed to persist client id; using it for this session only"
            ),
        }
        identity
    }
}
