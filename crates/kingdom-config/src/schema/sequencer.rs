//! Record sequencing configuration.

use serde::{Deserialize, Serialize};

/// What `restart()` does to the shuffled order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RestartPolicy {
    /// Jump back to the first record of the existing shuffle.
    #[default]
    Preserve,
    /// Draw a fresh permutation, then jump to its first record.
    Reshuffle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Fade duration around each step, in milliseconds (valid range: 0-5000).
    pub transition_delay_ms: u32,
    pub restart_policy: RestartPolicy,
    /// Fixed seed for the load-time shuffle. Unset draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            transition_delay_ms: 300,
            restart_policy: RestartPolicy::Preserve,
            shuffle_seed: None,
        }
    }
}
