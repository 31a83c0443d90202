use sea_orm::DbErr;

/// Errors surfaced by the feed-sync core and shared across its crates.
///
/// Record-level and mapping errors are expected to be caught and turned into
/// a failed [`crate::GroupSyncResult`] by the engine; bootstrap and
/// finalization errors (missing metadata, the last-full-sync timestamp
/// update) propagate to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("no feed registered under name '{0}'")]
    NotFound(String),
    #[error("feed '{0}' has no metadata row; bootstrap via metadata sync first")]
    MissingMetadata(String),
    #[error("no mapper registered for group '{0}'")]
    MissingMapper(String),
    #[error("raw record is missing required field '{0}'")]
    MissingField(String),
    #[error("group '{group}' for feed '{feed}' is not present in feed metadata")]
    UnknownGroup { feed: String, group: String },
    #[error(transparent)]
    EventDelivery(anyhow::Error),
}
