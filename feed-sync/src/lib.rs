//! Feed synchronization core: takes a downloaded, on-disk snapshot of one or
//! more vulnerability/package feeds and merges it into the relational
//! store, one group at a time, in bounded-memory chunks.
//!
//! The generic sync engine (see [`engine`]) is written once, over a
//! `FeedCapabilities<R>` value; concrete feeds in [`feeds`] and
//! [`vulnerability`] only supply the pieces that differ. [`registry`] is
//! the static, explicitly-built map from feed name to constructor that
//! callers bootstrap and sync through.

pub mod cache;
pub mod engine;
pub mod events;
pub mod feeds;
pub mod mapper;
pub mod model;
pub mod registry;
pub mod repo;
pub mod vulnerability;

pub use cache::GroupNameCache;
pub use engine::{Feed, FeedCapabilities, MappedRecord, NoopHooks, ServiceFeed, SyncHooks};
pub use events::{notify, EventClient, FeedEvent};
pub use mapper::{Mapper, MapperFactory, MapperSelector, NewMapper, SingleTypeMapperFactory};
pub use model::{DownloadResult, FeedSyncResult, FixedIn, GroupDownloadResult, GroupSyncResult, RawRecord, SyncStatus};
pub use registry::{FeedFactory, FeedRegistry};
pub use repo::LocalFeedDataRepo;
pub use vulnerability::{VulnerabilityProcessor, VulnerabilityRecord};

use crate::engine::VulnerabilityHooks;
use crate::feeds::generic::{GenericFlushStrategy, GenericMapper, GenericRecordCounter, GenericRecordUpdater};
use crate::feeds::nvdv2::{NvdV2FlushStrategy, NvdV2Mapper, NvdV2RecordCounter, NvdV2RecordUpdater};
use crate::feeds::packages::{GemMapper, NpmMapper, PackageFlushStrategy, PackageRecord, PackageRecordCounter, PackageRecordUpdater};
use crate::feeds::vulndb::{VulnDbFlushStrategy, VulnDbMapper, VulnDbRecordCounter, VulnDbRecordUpdater};
use crate::vulnerability::{VulnerabilityFlushStrategy, VulnerabilityMapper, VulnerabilityRecordCounter, VulnerabilityRecordUpdater};
use feedsync_common::{Error, SyncConfig};
use futures::FutureExt;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;

/// The feed names and group-to-mapper-field wiring the original source
/// registers at process startup. `key_field`s below follow the original's
/// per-feed `_cve_key`/primary-key conventions (see `DESIGN.md`).
pub fn default_registry(vulnerability_processor: Arc<dyn VulnerabilityProcessor>) -> FeedRegistry {
    let mut registry = FeedRegistry::new();

    registry.register(
        "vulnerabilities",
        Arc::new(move |db: DatabaseConnection| {
            let processor = vulnerability_processor.clone();
            async move {
                let capabilities = FeedCapabilities {
                    name: "vulnerabilities".to_string(),
                    mapper_selector: MapperSelector::Single(Arc::new(
                        SingleTypeMapperFactory::<VulnerabilityMapper>::new("Name"),
                    )),
                    record_updater: Arc::new(VulnerabilityRecordUpdater::new(processor)),
                    flush_strategy: Arc::new(VulnerabilityFlushStrategy),
                    record_counter: Arc::new(VulnerabilityRecordCounter),
                    hooks: Arc::new(VulnerabilityHooks),
                };
                let feed = ServiceFeed::bootstrap(db, capabilities, SyncConfig::default()).await?;
                Ok(Box::new(feed) as Box<dyn Feed>)
            }
            .boxed()
        }),
    );

    registry.register(
        "packages",
        Arc::new(|db: DatabaseConnection| {
            async move {
                let mut by_group: HashMap<String, Arc<dyn MapperFactory<PackageRecord>>> = HashMap::new();
                by_group.insert("gem".to_string(), Arc::new(SingleTypeMapperFactory::<GemMapper>::new("name")));
                by_group.insert("npm".to_string(), Arc::new(SingleTypeMapperFactory::<NpmMapper>::new("name")));

                let capabilities = FeedCapabilities {
                    name: "packages".to_string(),
                    mapper_selector: MapperSelector::ByGroup(by_group),
                    record_updater: Arc::new(PackageRecordUpdater),
                    flush_strategy: Arc::new(PackageFlushStrategy),
                    record_counter: Arc::new(PackageRecordCounter),
                    hooks: Arc::new(NoopHooks),
                };
                let feed = ServiceFeed::bootstrap(db, capabilities, SyncConfig::default()).await?;
                Ok(Box::new(feed) as Box<dyn Feed>)
            }
            .boxed()
        }),
    );

    registry.register(
        "nvdv2",
        Arc::new(|db: DatabaseConnection| {
            async move {
                let capabilities = FeedCapabilities {
                    name: "nvdv2".to_string(),
                    mapper_selector: MapperSelector::Single(Arc::new(
                        SingleTypeMapperFactory::<NvdV2Mapper>::new("id"),
                    )),
                    record_updater: Arc::new(NvdV2RecordUpdater),
                    flush_strategy: Arc::new(NvdV2FlushStrategy),
                    record_counter: Arc::new(NvdV2RecordCounter),
                    hooks: Arc::new(NoopHooks),
                };
                let feed = ServiceFeed::bootstrap(db, capabilities, SyncConfig::default()).await?;
                Ok(Box::new(feed) as Box<dyn Feed>)
            }
            .boxed()
        }),
    );

    registry.register(
        "vulndb",
        Arc::new(|db: DatabaseConnection| {
            async move {
                let capabilities = FeedCapabilities {
                    name: "vulndb".to_string(),
                    mapper_selector: MapperSelector::Single(Arc::new(
                        SingleTypeMapperFactory::<VulnDbMapper>::new("id"),
                    )),
                    record_updater: Arc::new(VulnDbRecordUpdater),
                    flush_strategy: Arc::new(VulnDbFlushStrategy),
                    record_counter: Arc::new(VulnDbRecordCounter),
                    hooks: Arc::new(NoopHooks),
                };
                let feed = ServiceFeed::bootstrap(db, capabilities, SyncConfig::default()).await?;
                Ok(Box::new(feed) as Box<dyn Feed>)
            }
            .boxed()
        }),
    );

    registry
}

/// Registers a feed backed by the generic, unspecialized record shape —
/// used for upstream feeds that need no dedicated entity family of their
/// own (e.g. distro feeds beyond the ones already specialized above).
pub fn register_generic_feed(registry: &mut FeedRegistry, name: impl Into<String> + Clone + Send + Sync + 'static) {
    let factory_name = name.clone();
    registry.register(
        name,
        Arc::new(move |db: DatabaseConnection| {
            let feed_name = factory_name.clone().into();
            async move {
                let capabilities: FeedCapabilities<_> = FeedCapabilities {
                    name: feed_name,
                    mapper_selector: MapperSelector::Single(Arc::new(
                        SingleTypeMapperFactory::<GenericMapper>::new("id"),
                    )),
                    record_updater: Arc::new(GenericRecordUpdater),
                    flush_strategy: Arc::new(GenericFlushStrategy),
                    record_counter: Arc::new(GenericRecordCounter),
                    hooks: Arc::new(NoopHooks),
                };
                let feed = ServiceFeed::bootstrap(db, capabilities, SyncConfig::default()).await?;
                Ok(Box::new(feed) as Box<dyn Feed>)
            }
            .boxed()
        }),
    );
}

/// The crate's error type, re-exported so downstream code matching on sync
/// results doesn't need a direct `feedsync-common` dependency.
pub type FeedSyncError = Error;
