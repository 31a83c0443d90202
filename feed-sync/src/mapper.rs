//! Per-feed translation from a raw feed record into a persistable,
//! strongly-typed record. Mappers are pure: no I/O, no session access.

use crate::model::RawRecord;
use feedsync_common::Error;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Translates one raw record into one mapped record of type `R`.
pub trait Mapper<R>: Send + Sync {
    fn map(&self, raw: &RawRecord) -> Result<R, Error>;
}

/// Builds a configured [`Mapper`] for a given `(feed_name, group_name)`.
pub trait MapperFactory<R>: Send + Sync {
    fn create(&self, feed_name: &str, group_name: &str) -> Arc<dyn Mapper<R>>;
}

/// A mapper type that can be constructed the way the original source
/// constructs them: `mapper_cls(feed_name, group_name, key_field)`.
pub trait NewMapper<R>: Mapper<R> + Sized {
    fn new(feed_name: String, group_name: String, key_field: Option<String>) -> Self;
}

/// Selects the mapper for a group: either one mapper type for every group
/// in the feed, or a per-group lookup table. Unknown group in the
/// `ByGroup` case is a [`Error::MissingMapper`].
pub enum MapperSelector<R> {
    Single(Arc<dyn MapperFactory<R>>),
    ByGroup(HashMap<String, Arc<dyn MapperFactory<R>>>),
}

impl<R> MapperSelector<R> {
    pub fn load(&self, feed_name: &str, group_name: &str) -> Result<Arc<dyn Mapper<R>>, Error> {
        match self {
            MapperSelector::Single(factory) => Ok(factory.create(feed_name, group_name)),
            MapperSelector::ByGroup(by_group) => by_group
                .get(group_name)
                .map(|factory| factory.create(feed_name, group_name))
                .ok_or_else(|| Error::MissingMapper(group_name.to_string())),
        }
    }
}

/// Convenience factory for feeds whose groups are homogeneous (e.g.
/// vulnerabilities, keyed by a single field across every group).
pub struct SingleTypeMapperFactory<M> {
    key_field: Option<String>,
    _mapper: PhantomData<fn() -> M>,
}

impl<M> SingleTypeMapperFactory<M> {
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: Some(key_field.into()),
            _mapper: PhantomData,
        }
    }
}

impl<M, R> MapperFactory<R> for SingleTypeMapperFactory<M>
where
    M: NewMapper<R> + 'static,
{
    fn create(&self, feed_name: &str, group_name: &str) -> Arc<dyn Mapper<R>> {
        Arc::new(M::new(
            feed_name.to_string(),
            group_name.to_string(),
            self.key_field.clone(),
        ))
    }
}
