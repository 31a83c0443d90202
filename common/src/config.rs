use serde::{Deserialize, Serialize};

/// Tunables for the sync engine. Loading this from the environment or a
/// config file is the caller's job (an external collaborator here); this
/// crate only describes the shape of the value and its defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Number of mapped records merged per transaction before an
    /// intermediate commit. Bounds memory use independent of feed size.
    pub records_per_chunk: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            records_per_chunk: 500,
        }
    }
}
