//! The feed registry (spec §4.1): a static map from feed name to a
//! constructor, built once at startup rather than discovered by reflective
//! subclass scanning.
//!
//! The original source falls back to the first-registered feed on an
//! unrecognized name — almost certainly a bug (see `SPEC_FULL.md` §9).
//! [`FeedRegistry::get`] does an exact, case-insensitive lookup and returns
//! [`Error::NotFound`] on a miss instead.

use crate::engine::Feed;
use feedsync_common::Error;
use futures::future::BoxFuture;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructs a ready-to-sync [`Feed`] against a live connection. Boxed
/// because each feed's concrete `ServiceFeed<R>` has a different `R`.
pub type FeedFactory =
    Arc<dyn Fn(DatabaseConnection) -> BoxFuture<'static, Result<Box<dyn Feed>, Error>> + Send + Sync>;

/// The set of feeds known to this process, keyed by name.
#[derive(Clone, Default)]
pub struct FeedRegistry {
    factories: HashMap<String, FeedFactory>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a feed constructor under `name`. Later registrations for
    /// the same name (case-insensitively) replace earlier ones.
    pub fn register(&mut self, name: impl Into<String>, factory: FeedFactory) {
        self.factories.insert(name.into().to_lowercase(), factory);
    }

    /// Every registered feed name, in registration order is not preserved
    /// (`HashMap`); callers that need a stable order should sort.
    pub fn registered_feed_names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Bootstraps the named feed against `db`. Exact match only, so an
    /// unrecognized name fails loudly instead of silently syncing the
    /// wrong feed.
    pub async fn get_feed_by_name(
        &self,
        name: &str,
        db: DatabaseConnection,
    ) -> Result<Box<dyn Feed>, Error> {
        let factory = self
            .factories
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        factory(db).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::{FeedCapabilities, NoopHooks, ServiceFeed};
    use crate::feeds::generic::{
        GenericFlushStrategy, GenericMapper, GenericRecordCounter, GenericRecordUpdater,
    };
    use crate::mapper::MapperSelector;
    use feedsync_common::SyncConfig;
    use futures::FutureExt;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn generic_factory(name: &'static str) -> FeedFactory {
        Arc::new(move |db: DatabaseConnection| {
            async move {
                let capabilities = FeedCapabilities {
                    name: name.to_string(),
                    mapper_selector: MapperSelector::Single(Arc::new(
                        crate::mapper::SingleTypeMapperFactory::<GenericMapper>::new("id"),
                    )),
                    record_updater: Arc::new(GenericRecordUpdater),
                    flush_strategy: Arc::new(GenericFlushStrategy),
                    record_counter: Arc::new(GenericRecordCounter),
                    hooks: Arc::new(NoopHooks),
                };
                let feed =
                    ServiceFeed::bootstrap(db, capabilities, SyncConfig::default()).await?;
                Ok(Box::new(feed) as Box<dyn Feed>)
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn unknown_feed_name_is_not_found_not_fallback() {
        let mut registry = FeedRegistry::new();
        registry.register("npm", generic_factory("npm"));
        registry.register("gem", generic_factory("gem"));

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = registry
            .get_feed_by_name("does-not-exist", db)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(name) if name == "does-not-exist"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = FeedRegistry::new();
        registry.register("Npm", generic_factory("npm"));
        assert!(registry.factories.contains_key("npm"));
    }
}
