//! The generic chunked-merge sync engine (spec §4.3): for each group in the
//! download manifest that belongs to a feed, optionally flush, merge
//! records in bounded-size chunks, commit, advance `last_sync`, and emit
//! events — all isolated per group so one poisoned group never aborts the
//! feed.
//!
//! Per the capability-set redesign (spec §9): a feed is a value,
//! [`FeedCapabilities`], not a class hierarchy. [`ServiceFeed`] is the one
//! engine implementation; `mapper_selector`/`record_updater`/
//! `flush_strategy`/`record_counter`/`hooks` are what differ between the
//! generic feed and the vulnerability feed.

use crate::cache::GroupNameCache;
use crate::events::{notify, EventClient, FeedEvent};
use crate::mapper::MapperSelector;
use crate::model::{FeedSyncResult, GroupDownloadResult, GroupSyncResult, RawRecord, SyncStatus};
use crate::repo::LocalFeedDataRepo;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feedsync_common::{Error, SyncConfig};
use feedsync_entity::{feed_group_metadata, feed_metadata};
use futures::StreamExt;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, TransactionTrait,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// A value mapped from a raw record, keyed `(namespace_name, id)`.
pub trait MappedRecord: Send + Sync {
    fn namespace_name(&self) -> &str;
    fn id(&self) -> &str;
}

/// Persists one mapped record within the current group transaction,
/// returning the image ids (if any) whose match state changed as a result.
/// The generic feed's updater always returns an empty vec.
#[async_trait]
pub trait RecordUpdater<R>: Send + Sync {
    async fn update(&self, txn: &DatabaseTransaction, record: R) -> Result<Vec<Uuid>, Error>;
}

/// Removes persisted data owned by `(feed, group)` ahead of a full-flush
/// sync. Does not commit; participates in the caller's transaction.
#[async_trait]
pub trait FlushStrategy: Send + Sync {
    async fn flush(&self, txn: &DatabaseTransaction, group_name: &str) -> Result<(), Error>;
}

/// Reports the number of persisted primary entities for a group.
#[async_trait]
pub trait RecordCounter: Send + Sync {
    async fn count(&self, db: &DatabaseConnection, group_name: &str) -> Result<u64, Error>;
}

/// Lifecycle hooks wrapping an entire feed sync. Used by the vulnerability
/// feed to publish/clear the group-name cache; a no-op for every other
/// feed.
pub trait SyncHooks: Send + Sync {
    fn on_sync_start(&self, _group_names: &[String]) {}
    fn on_sync_end(&self) {}
}

#[derive(Default)]
pub struct NoopHooks;

impl SyncHooks for NoopHooks {}

/// The set of operations that distinguish one feed from another. The
/// generic sync loop is written once, over `&FeedCapabilities<R>`.
pub struct FeedCapabilities<R> {
    pub name: String,
    pub mapper_selector: MapperSelector<R>,
    pub record_updater: Arc<dyn RecordUpdater<R>>,
    pub flush_strategy: Arc<dyn FlushStrategy>,
    pub record_counter: Arc<dyn RecordCounter>,
    pub hooks: Arc<dyn SyncHooks>,
}

/// Type-erased feed handle, for the registry (which must hold feeds with
/// different `R` in one map).
#[async_trait]
pub trait Feed: Send + Sync {
    fn name(&self) -> &str;

    async fn sync(
        &mut self,
        repo: &dyn LocalFeedDataRepo,
        full_flush: bool,
        event_client: Option<&dyn EventClient>,
        operation_id: Option<&str>,
    ) -> Result<FeedSyncResult, Error>;

    async fn record_count(&self, group_name: &str) -> Result<u64, Error>;
}

/// Short-lived, refreshed-before-each-mutation view of a feed's metadata
/// row plus its group rows.
#[derive(Clone, Debug)]
struct FeedMetadataState {
    name: String,
    groups: Vec<feed_group_metadata::Model>,
}

impl FeedMetadataState {
    async fn load(db: &DatabaseConnection, name: &str) -> Result<Self, Error> {
        feed_metadata::Entity::find_by_id(name.to_string())
            .one(db)
            .await?
            .ok_or_else(|| Error::MissingMetadata(name.to_string()))?;

        let groups = feed_group_metadata::Entity::find()
            .filter(feed_group_metadata::Column::FeedName.eq(name))
            .all(db)
            .await?;

        Ok(Self {
            name: name.to_string(),
            groups,
        })
    }

    async fn refresh(&mut self, db: &DatabaseConnection) -> Result<(), Error> {
        *self = Self::load(db, &self.name).await?;
        Ok(())
    }

    fn group_by_name(&self, name: &str) -> Option<&feed_group_metadata::Model> {
        self.groups.iter().find(|group| group.name == name)
    }

    fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|group| group.name.clone()).collect()
    }
}

/// The generic sync engine, parameterized over the mapped record type a
/// particular feed produces.
pub struct ServiceFeed<R> {
    db: DatabaseConnection,
    metadata: FeedMetadataState,
    capabilities: FeedCapabilities<R>,
    config: SyncConfig,
}

impl<R> ServiceFeed<R>
where
    R: MappedRecord + 'static,
{
    /// Loads `FeedMetadata` from the database. Fails with
    /// [`Error::MissingMetadata`] if the feed hasn't been bootstrapped by an
    /// earlier metadata sync — a feed instance refuses to exist otherwise.
    pub async fn bootstrap(
        db: DatabaseConnection,
        capabilities: FeedCapabilities<R>,
        config: SyncConfig,
    ) -> Result<Self, Error> {
        let metadata = FeedMetadataState::load(&db, &capabilities.name).await?;
        Ok(Self {
            db,
            metadata,
            capabilities,
            config,
        })
    }

    pub async fn sync(
        &mut self,
        repo: &dyn LocalFeedDataRepo,
        full_flush: bool,
        event_client: Option<&dyn EventClient>,
        operation_id: Option<&str>,
    ) -> Result<FeedSyncResult, Error> {
        self.capabilities.hooks.on_sync_start(&self.metadata.group_names());
        let result = self
            .sync_inner(repo, full_flush, event_client, operation_id)
            .await;
        self.capabilities.hooks.on_sync_end();
        result
    }

    async fn sync_inner(
        &mut self,
        repo: &dyn LocalFeedDataRepo,
        full_flush: bool,
        event_client: Option<&dyn EventClient>,
        operation_id: Option<&str>,
    ) -> Result<FeedSyncResult, Error> {
        let feed_name = self.capabilities.name.clone();
        let start = Instant::now();
        let mut groups = Vec::new();
        let mut failed_count = 0usize;

        tracing::info!(feed = %feed_name, operation_id, "starting feed sync");

        let manifest: Vec<GroupDownloadResult> = repo
            .download_result()
            .results
            .iter()
            .filter(|group_download| group_download.feed == feed_name)
            .cloned()
            .collect();

        for group_download in &manifest {
            notify(
                FeedEvent::FeedGroupSyncStarted {
                    feed: feed_name.clone(),
                    group: group_download.group.clone(),
                },
                event_client,
            )
            .await;

            match self
                .sync_group(group_download, full_flush, repo, operation_id)
                .await
            {
                // `sync_group` only ever returns `Ok` on success (an
                // unknown group or any mid-sync failure is surfaced as
                // `Err` below); a failed group-result is never smuggled
                // through the `Ok` arm.
                Ok(group_result) => {
                    notify(
                        FeedEvent::FeedGroupSyncCompleted {
                            feed: feed_name.clone(),
                            group: group_download.group.clone(),
                            result: group_result.clone(),
                        },
                        event_client,
                    )
                    .await;
                    groups.push(group_result);
                }
                Err(err) => {
                    failed_count += 1;
                    log::error!(
                        "(operation_id={operation_id:?}, feed={feed_name}, group={}) failed syncing group data: {err}",
                        group_download.group
                    );
                    notify(
                        FeedEvent::FeedGroupSyncFailed {
                            feed: feed_name.clone(),
                            group: group_download.group.clone(),
                            error: err.to_string(),
                        },
                        event_client,
                    )
                    .await;
                    groups.push(GroupSyncResult::failed(group_download.group.clone()));
                }
            }
        }

        let sync_time = start.elapsed().as_secs_f64();

        // Feed-level finalization. Errors here are not contained to a
        // group: they roll back and propagate to the caller.
        self.update_last_full_sync_timestamp().await?;

        Ok(FeedSyncResult {
            feed: feed_name,
            status: if failed_count == 0 {
                SyncStatus::Success
            } else {
                SyncStatus::Failure
            },
            total_time_seconds: sync_time,
            groups,
        })
    }

    #[tracing::instrument(skip_all, fields(feed = %self.capabilities.name, group = %group_download.group, operation_id = ?operation_id), err)]
    async fn sync_group(
        &mut self,
        group_download: &GroupDownloadResult,
        full_flush: bool,
        repo: &dyn LocalFeedDataRepo,
        operation_id: Option<&str>,
    ) -> Result<GroupSyncResult, Error> {
        self.metadata.refresh(&self.db).await?;

        let Some(group) = self.metadata.group_by_name(&group_download.group).cloned() else {
            // Not an exception in the original source either: the caller
            // (`sync_inner`'s `Err` arm) turns this into a failed
            // group-result and keeps going with the next group; no
            // transaction is ever opened for it.
            return Err(Error::UnknownGroup {
                feed: self.capabilities.name.clone(),
                group: group_download.group.clone(),
            });
        };

        let download_started = group_download.started;
        let sync_started = Instant::now();

        let outcome = self
            .run_group_transactionally(&group, group_download, full_flush, repo, download_started)
            .await;

        let sync_time = sync_started.elapsed().as_secs_f64();
        let total_group_time = (Utc::now() - download_started)
            .num_milliseconds()
            .max(0) as f64
            / 1000.0;
        log::info!(
            "(operation_id={operation_id:?}, feed={}, group={}) sync to db duration: {sync_time}s, total duration incl. download: {total_group_time}s",
            self.capabilities.name, group.name
        );

        let (total_updated_count, updated_image_ids) = outcome?;
        log::info!(
            "(operation_id={operation_id:?}, feed={}, group={}) {} distinct images affected by this group's updates",
            self.capabilities.name,
            group.name,
            updated_image_ids.len()
        );

        Ok(GroupSyncResult {
            group: group_download.group.clone(),
            status: SyncStatus::Success,
            total_time_seconds: total_group_time,
            updated_record_count: total_updated_count,
            // The union set above is the observability signal spec §4.4
            // calls for; this field itself stays 0 — see `DESIGN.md` and
            // `model.rs`'s doc comment on `updated_image_count`.
            updated_image_count: 0,
        })
    }

    async fn run_group_transactionally(
        &self,
        group: &feed_group_metadata::Model,
        group_download: &GroupDownloadResult,
        full_flush: bool,
        repo: &dyn LocalFeedDataRepo,
        download_started: DateTime<Utc>,
    ) -> Result<(u64, HashSet<Uuid>), Error> {
        let mut txn = self.db.begin().await?;

        if full_flush {
            log::info!(
                "(feed={}, group={}) performing data flush prior to sync",
                self.capabilities.name, group.name
            );
            self.capabilities.flush_strategy.flush(&txn, &group.name).await?;
        }

        let mapper = self
            .capabilities
            .mapper_selector
            .load(&self.capabilities.name, &group.name)?;

        let mut stream = repo.read(&self.capabilities.name, &group.name, 0);
        let mut count = 0usize;
        let mut total_updated_count = 0u64;
        let mut updated_image_ids: HashSet<Uuid> = HashSet::new();

        log::info!(
            "(feed={}, group={}) syncing {} total update records into db in sets of {}",
            self.capabilities.name,
            group.name,
            group_download.total_records,
            self.config.records_per_chunk
        );

        while let Some(raw) = stream.next().await {
            let raw: RawRecord = raw?;
            let mapped = mapper.map(&raw)?;
            let changed_images = self.capabilities.record_updater.update(&txn, mapped).await?;
            updated_image_ids.extend(changed_images);
            total_updated_count += 1;
            count += 1;

            if count >= self.config.records_per_chunk {
                txn.commit().await?;
                log::info!(
                    "(feed={}, group={}) db update progress: {total_updated_count}/{}",
                    self.capabilities.name, group.name, group_download.total_records
                );
                txn = self.db.begin().await?;
                count = 0;
            }
        }

        txn.commit().await?;
        log::info!(
            "(feed={}, group={}) db update progress: {total_updated_count}/{}",
            self.capabilities.name, group.name, group_download.total_records
        );

        let txn = self.db.begin().await?;
        let mut active: feed_group_metadata::ActiveModel = group.clone().into();
        active.last_sync = Set(Some(download_started));
        active.update(&txn).await?;
        txn.commit().await?;

        Ok((total_updated_count, updated_image_ids))
    }

    async fn update_last_full_sync_timestamp(&mut self) -> Result<(), Error> {
        self.metadata.refresh(&self.db).await?;

        let txn = self.db.begin().await?;
        let row = feed_metadata::Entity::find_by_id(self.metadata.name.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| Error::MissingMetadata(self.metadata.name.clone()))?;

        let now = Utc::now();
        let mut active: feed_metadata::ActiveModel = row.into();
        active.last_update = Set(Some(now));
        active.last_full_sync = Set(Some(now));
        active.update(&txn).await?;
        txn.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl<R> Feed for ServiceFeed<R>
where
    R: MappedRecord + 'static,
{
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    async fn sync(
        &mut self,
        repo: &dyn LocalFeedDataRepo,
        full_flush: bool,
        event_client: Option<&dyn EventClient>,
        operation_id: Option<&str>,
    ) -> Result<FeedSyncResult, Error> {
        ServiceFeed::sync(self, repo, full_flush, event_client, operation_id).await
    }

    async fn record_count(&self, group_name: &str) -> Result<u64, Error> {
        self.capabilities.record_counter.count(&self.db, group_name).await
    }
}

/// Surfaces cache state for the vulnerability feed's hooks without a
/// dependency cycle between `cache` and `engine`.
pub(crate) struct VulnerabilityHooks;

impl SyncHooks for VulnerabilityHooks {
    fn on_sync_start(&self, group_names: &[String]) {
        GroupNameCache::add(group_names.iter().cloned());
    }

    fn on_sync_end(&self) {
        GroupNameCache::flush();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mapper::{Mapper, NewMapper, SingleTypeMapperFactory};
    use crate::model::DownloadResult;
    use chrono::TimeZone;
    use futures::stream::BoxStream;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A trivial mapped record: `id` doubles as the field the test asserts
    /// on, `namespace_name` is the group it was read for.
    struct TestRecord {
        namespace_name: String,
        id: String,
    }

    impl MappedRecord for TestRecord {
        fn namespace_name(&self) -> &str {
            &self.namespace_name
        }

        fn id(&self) -> &str {
            &self.id
        }
    }

    struct TestMapper {
        group_name: String,
    }

    impl NewMapper<TestRecord> for TestMapper {
        fn new(_feed_name: String, group_name: String, _key_field: Option<String>) -> Self {
            Self { group_name }
        }
    }

    impl Mapper<TestRecord> for TestMapper {
        fn map(&self, raw: &RawRecord) -> Result<TestRecord, Error> {
            let id = raw
                .get("id")
                .and_then(|value| value.as_str())
                .ok_or_else(|| Error::MissingField("id".to_string()))?
                .to_string();
            Ok(TestRecord {
                namespace_name: self.group_name.clone(),
                id,
            })
        }
    }

    /// Records every id it was asked to persist, in order, and never
    /// touches the database — isolates the engine's chunking/transaction
    /// logic from sea-orm's entity wire format. Fails every record in
    /// `fail_group`, simulating a mapper/record-updater error partway
    /// through one group.
    struct TestRecordUpdater {
        fail_group: Option<String>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RecordUpdater<TestRecord> for TestRecordUpdater {
        async fn update(&self, _txn: &DatabaseTransaction, record: TestRecord) -> Result<Vec<Uuid>, Error> {
            if self.fail_group.as_deref() == Some(record.namespace_name.as_str()) {
                return Err(Error::MissingField(format!(
                    "simulated failure in group {}",
                    record.namespace_name
                )));
            }
            self.calls.lock().unwrap().push(record.id.clone());
            Ok(Vec::new())
        }
    }

    struct TestFlushStrategy;

    #[async_trait]
    impl FlushStrategy for TestFlushStrategy {
        async fn flush(&self, _txn: &DatabaseTransaction, _group_name: &str) -> Result<(), Error> {
            Ok(())
        }
    }

    struct TestRecordCounter;

    #[async_trait]
    impl RecordCounter for TestRecordCounter {
        async fn count(&self, _db: &DatabaseConnection, _group_name: &str) -> Result<u64, Error> {
            Ok(0)
        }
    }

    /// An in-memory `LocalFeedDataRepo` scripted directly from a manifest
    /// and a per-group record list; no filesystem, no download.
    struct FakeRepo {
        manifest: DownloadResult,
        records: HashMap<(String, String), Vec<serde_json::Value>>,
    }

    impl FakeRepo {
        fn new(
            groups: Vec<GroupDownloadResult>,
            records: impl IntoIterator<Item = ((String, String), Vec<serde_json::Value>)>,
        ) -> Self {
            Self {
                manifest: DownloadResult { results: groups },
                records: records.into_iter().collect(),
            }
        }
    }

    #[async_trait]
    impl LocalFeedDataRepo for FakeRepo {
        fn download_result(&self) -> &DownloadResult {
            &self.manifest
        }

        fn read(&self, feed: &str, group: &str, _from_index: u64) -> BoxStream<'_, Result<RawRecord, Error>> {
            let records = self
                .records
                .get(&(feed.to_string(), group.to_string()))
                .cloned()
                .unwrap_or_default();
            futures::stream::iter(records.into_iter().map(Ok)).boxed()
        }
    }

    fn feed_row(name: &str) -> feed_metadata::Model {
        feed_metadata::Model {
            name: name.to_string(),
            last_update: None,
            last_full_sync: None,
        }
    }

    fn group_row(
        feed: &str,
        name: &str,
        last_sync: Option<DateTime<Utc>>,
    ) -> feed_group_metadata::Model {
        feed_group_metadata::Model {
            feed_name: feed.to_string(),
            name: name.to_string(),
            last_sync,
        }
    }

    fn capabilities(
        feed_name: &str,
        fail_group: Option<&str>,
        calls: Arc<Mutex<Vec<String>>>,
    ) -> FeedCapabilities<TestRecord> {
        FeedCapabilities {
            name: feed_name.to_string(),
            mapper_selector: MapperSelector::Single(Arc::new(SingleTypeMapperFactory::<
                TestMapper,
            >::new("id"))),
            record_updater: Arc::new(TestRecordUpdater {
                fail_group: fail_group.map(str::to_string),
                calls,
            }),
            flush_strategy: Arc::new(TestFlushStrategy),
            record_counter: Arc::new(TestRecordCounter),
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Spec §8's "exactly `RECORDS_PER_CHUNK` records" boundary: two
    /// records with a chunk size of two trip one commit from the chunk rule
    /// plus a second, empty residual commit. Both must leave every record
    /// merged and `last_sync` advanced.
    #[tokio::test]
    async fn chunk_boundary_commits_full_chunk_and_residual() {
        let feed_name = "generic-test";
        let group_name = "g1";
        let started = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let feed = feed_row(feed_name);
        let group_initial = group_row(feed_name, group_name, None);
        let group_synced = group_row(feed_name, group_name, Some(started));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // bootstrap: FeedMetadataState::load
            .append_query_results(vec![vec![feed.clone()]])
            .append_query_results(vec![vec![group_initial.clone()]])
            // sync_group: metadata.refresh
            .append_query_results(vec![vec![feed.clone()]])
            .append_query_results(vec![vec![group_initial.clone()]])
            // run_group_transactionally: feed_group_metadata last_sync update (RETURNING)
            .append_query_results(vec![vec![group_synced.clone()]])
            // update_last_full_sync_timestamp: metadata.refresh
            .append_query_results(vec![vec![feed.clone()]])
            .append_query_results(vec![vec![group_synced.clone()]])
            // update_last_full_sync_timestamp: feed_metadata::find_by_id
            .append_query_results(vec![vec![feed.clone()]])
            // update_last_full_sync_timestamp: feed_metadata update (RETURNING)
            .append_query_results(vec![vec![feed.clone()]])
            // Spare exec results for the two `ActiveModelTrait::update()` calls
            // above, in case the backend takes the non-RETURNING exec+refetch
            // path instead of RETURNING; unused if it doesn't.
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                };
                2
            ])
            .into_connection();

        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut feed = ServiceFeed::bootstrap(
            db,
            capabilities(feed_name, None, calls.clone()),
            SyncConfig {
                records_per_chunk: 2,
            },
        )
        .await
        .unwrap();

        let repo = FakeRepo::new(
            vec![GroupDownloadResult {
                feed: feed_name.to_string(),
                group: group_name.to_string(),
                started,
                total_records: 2,
            }],
            [(
                (feed_name.to_string(), group_name.to_string()),
                vec![serde_json::json!({"id": "a"}), serde_json::json!({"id": "b"})],
            )],
        );

        let result = feed.sync(&repo, false, None, Some("op-1")).await.unwrap();

        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].status, SyncStatus::Success);
        assert_eq!(result.groups[0].updated_record_count, 2);
        assert_eq!(calls.lock().unwrap().as_slice(), ["a", "b"]);
    }

    /// Spec §8's group-failure-isolation scenario: one group's records fail
    /// to merge; the feed still syncs every other group and reports
    /// overall failure without rolling back the groups that succeeded.
    #[tokio::test]
    async fn failing_group_does_not_abort_the_feed() {
        let feed_name = "generic-test";
        let started = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let feed = feed_row(feed_name);
        let bad = group_row(feed_name, "debian:10", None);
        let good = group_row(feed_name, "ubuntu:20.04", None);
        let good_synced = group_row(feed_name, "ubuntu:20.04", Some(started));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // bootstrap
            .append_query_results(vec![vec![feed.clone()]])
            .append_query_results(vec![vec![bad.clone(), good.clone()]])
            // sync_group(debian:10): refresh, then fails before any update
            .append_query_results(vec![vec![feed.clone()]])
            .append_query_results(vec![vec![bad.clone(), good.clone()]])
            // sync_group(ubuntu:20.04): refresh
            .append_query_results(vec![vec![feed.clone()]])
            .append_query_results(vec![vec![bad.clone(), good.clone()]])
            // last_sync update for ubuntu:20.04 (RETURNING)
            .append_query_results(vec![vec![good_synced.clone()]])
            // update_last_full_sync_timestamp: refresh
            .append_query_results(vec![vec![feed.clone()]])
            .append_query_results(vec![vec![bad.clone(), good_synced.clone()]])
            // update_last_full_sync_timestamp: feed_metadata::find_by_id
            .append_query_results(vec![vec![feed.clone()]])
            // update_last_full_sync_timestamp: feed_metadata update (RETURNING)
            .append_query_results(vec![vec![feed.clone()]])
            // Spare exec results, see the chunk-boundary test above.
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                };
                2
            ])
            .into_connection();

        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut feed = ServiceFeed::bootstrap(
            db,
            capabilities(feed_name, Some("debian:10"), calls.clone()),
            SyncConfig::default(),
        )
        .await
        .unwrap();

        let repo = FakeRepo::new(
            vec![
                GroupDownloadResult {
                    feed: feed_name.to_string(),
                    group: "debian:10".to_string(),
                    started,
                    total_records: 1,
                },
                GroupDownloadResult {
                    feed: feed_name.to_string(),
                    group: "ubuntu:20.04".to_string(),
                    started,
                    total_records: 1,
                },
            ],
            [
                (
                    (feed_name.to_string(), "debian:10".to_string()),
                    vec![serde_json::json!({"id": "CVE-1"})],
                ),
                (
                    (feed_name.to_string(), "ubuntu:20.04".to_string()),
                    vec![serde_json::json!({"id": "pkg-1"})],
                ),
            ],
        );

        let result = feed.sync(&repo, false, None, None).await.unwrap();

        assert_eq!(result.status, SyncStatus::Failure);
        assert_eq!(result.groups.len(), 2);

        let debian = result
            .groups
            .iter()
            .find(|group| group.group == "debian:10")
            .unwrap();
        assert_eq!(debian.status, SyncStatus::Failure);
        assert_eq!(debian.updated_record_count, 0);

        let ubuntu = result
            .groups
            .iter()
            .find(|group| group.group == "ubuntu:20.04")
            .unwrap();
        assert_eq!(ubuntu.status, SyncStatus::Success);
        assert_eq!(ubuntu.updated_record_count, 1);

        assert_eq!(calls.lock().unwrap().as_slice(), ["pkg-1"]);
    }
}
