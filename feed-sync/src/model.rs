//! Transient, wire-ish types: the download manifest the downloader hands
//! us, and the result records the engine hands back to its caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An opaque, JSON-shaped raw record as handed back by
/// [`crate::repo::LocalFeedDataRepo::read`].
pub type RawRecord = serde_json::Value;

/// One `(feed, group)` entry in a download manifest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupDownloadResult {
    pub feed: String,
    pub group: String,
    /// UTC instant marking when the download began; becomes the new
    /// `last_sync` for the group on a successful sync.
    pub started: DateTime<Utc>,
    pub total_records: u64,
}

/// The manifest produced by the (external) downloader and consumed by a
/// sync call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DownloadResult {
    pub results: Vec<GroupDownloadResult>,
}

/// `success` or `failure`, kept as a string-like enum so the serialized
/// result record matches the stable `status: "success"|"failure"` surface
/// callers depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failure,
}

impl SyncStatus {
    pub fn is_success(self) -> bool {
        matches!(self, SyncStatus::Success)
    }
}

/// Result of syncing a single group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupSyncResult {
    pub group: String,
    pub status: SyncStatus,
    pub total_time_seconds: f64,
    pub updated_record_count: u64,
    /// Always 0 in the current design even though the engine computes a
    /// union of updated image ids internally — preserved for observability
    /// parity with the original source rather than changed on a whim. See
    /// `DESIGN.md`.
    pub updated_image_count: u64,
}

impl GroupSyncResult {
    pub fn failed(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            status: SyncStatus::Failure,
            total_time_seconds: 0.0,
            updated_record_count: 0,
            updated_image_count: 0,
        }
    }
}

/// Result of syncing an entire feed (all of its manifested groups).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedSyncResult {
    pub feed: String,
    pub status: SyncStatus,
    pub total_time_seconds: f64,
    pub groups: Vec<GroupSyncResult>,
}

/// A `(name, epochless_version, version)` triple. Equality/hashing is what
/// match-equivalence compares the `fixed_in` sets on.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIn {
    pub name: String,
    pub epochless_version: String,
    pub version: String,
}
