//! The default feed shape: one row per `(namespace_name, id)`, storing the
//! mapped record as opaque JSON. Used by every feed with no specialized
//! entity family of its own (the original source's default
//! `AnchoreServiceFeed` path).

use crate::engine::{FlushStrategy, MappedRecord, RecordCounter, RecordUpdater};
use crate::mapper::{Mapper, NewMapper};
use crate::model::RawRecord;
use async_trait::async_trait;
use feedsync_common::Error;
use feedsync_entity::generic_feed_data_record;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter,
};

/// A mapped record destined for [`generic_feed_data_record`].
#[derive(Clone, Debug)]
pub struct GenericRecord {
    pub namespace_name: String,
    pub id: String,
    pub data: serde_json::Value,
}

impl MappedRecord for GenericRecord {
    fn namespace_name(&self) -> &str {
        &self.namespace_name
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Reads the primary key out of `key_field` (defaults to `"id"`, per the
/// original source's per-feed `SingleTypeMapperFactory` convention) and
/// keeps the raw JSON verbatim as `data`.
pub struct GenericMapper {
    group_name: String,
    key_field: String,
}

impl NewMapper<GenericRecord> for GenericMapper {
    fn new(_feed_name: String, group_name: String, key_field: Option<String>) -> Self {
        Self {
            group_name,
            key_field: key_field.unwrap_or_else(|| "id".to_string()),
        }
    }
}

impl Mapper<GenericRecord> for GenericMapper {
    fn map(&self, raw: &RawRecord) -> Result<GenericRecord, Error> {
        let id = raw
            .get(&self.key_field)
            .and_then(|value| value.as_str())
            .ok_or_else(|| Error::MissingField(self.key_field.clone()))?
            .to_string();

        Ok(GenericRecord {
            namespace_name: self.group_name.clone(),
            id,
            data: raw.clone(),
        })
    }
}

pub struct GenericRecordUpdater;

#[async_trait]
impl RecordUpdater<GenericRecord> for GenericRecordUpdater {
    async fn update(
        &self,
        txn: &DatabaseTransaction,
        record: GenericRecord,
    ) -> Result<Vec<uuid::Uuid>, Error> {
        let active = generic_feed_data_record::ActiveModel {
            namespace_name: sea_orm::ActiveValue::Set(record.namespace_name),
            id: sea_orm::ActiveValue::Set(record.id),
            data: sea_orm::ActiveValue::Set(record.data),
        };

        generic_feed_data_record::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    generic_feed_data_record::Column::NamespaceName,
                    generic_feed_data_record::Column::Id,
                ])
                .update_column(generic_feed_data_record::Column::Data)
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        // The generic feed never drives image match recomputation.
        Ok(Vec::new())
    }
}

pub struct GenericFlushStrategy;

#[async_trait]
impl FlushStrategy for GenericFlushStrategy {
    // Unlike the specialized feeds, the generic feed's flush wipes the
    // whole table rather than scoping to `group_name` — spec §4.5's
    // entity-deletion table lists "all generic feed-data records" for this
    // feed, and the original source's equivalent is an unconditional
    // `delete()` with no namespace filter.
    async fn flush(&self, txn: &DatabaseTransaction, _group_name: &str) -> Result<(), Error> {
        generic_feed_data_record::Entity::delete_many().exec(txn).await?;
        Ok(())
    }
}

pub struct GenericRecordCounter;

#[async_trait]
impl RecordCounter for GenericRecordCounter {
    async fn count(&self, db: &DatabaseConnection, group_name: &str) -> Result<u64, Error> {
        let count = generic_feed_data_record::Entity::find()
            .filter(generic_feed_data_record::Column::NamespaceName.eq(group_name))
            .count(db)
            .await?;
        Ok(count)
    }
}
