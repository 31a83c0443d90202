//! The boundary to the (external) on-disk download repository. The engine
//! only ever reads through this trait; the downloader that populates it and
//! the download manifest format it yields are out of scope here.

use crate::model::{DownloadResult, RawRecord};
use async_trait::async_trait;
use feedsync_common::Error;
use futures::stream::BoxStream;

/// A finite, restartable sequence of raw records for a `(feed, group)` pair,
/// plus the manifest summarizing what was fetched.
#[async_trait]
pub trait LocalFeedDataRepo: Send + Sync {
    /// The manifest describing everything this repo instance has fetched.
    fn download_result(&self) -> &DownloadResult;

    /// Stream raw records for `(feed, group)` starting at `from_index` (0 =
    /// from the start). Implementations must be restartable from any
    /// non-negative offset.
    fn read(&self, feed: &str, group: &str, from_index: u64) -> BoxStream<'_, Result<RawRecord, Error>>;
}
