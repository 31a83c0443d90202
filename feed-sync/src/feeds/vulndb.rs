//! The `vulndb` feed: the on-prem enterprise CVE source. Same shape as
//! `nvdv2` (metadata row plus child CPE matches) but its own entity family
//! and feed name, since the two are populated from unrelated upstreams.

use crate::engine::{FlushStrategy, MappedRecord, RecordCounter, RecordUpdater};
use crate::mapper::{Mapper, NewMapper};
use crate::model::RawRecord;
use async_trait::async_trait;
use feedsync_common::Error;
use feedsync_entity::{vulndb_cpe, vulndb_metadata};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter,
};

#[derive(Clone, Debug)]
pub struct VulnDbRecord {
    pub id: String,
    pub namespace_name: String,
    pub data: serde_json::Value,
}

impl MappedRecord for VulnDbRecord {
    fn namespace_name(&self) -> &str {
        &self.namespace_name
    }

    fn id(&self) -> &str {
        &self.id
    }
}

pub struct VulnDbMapper {
    group_name: String,
    key_field: String,
}

impl NewMapper<VulnDbRecord> for VulnDbMapper {
    fn new(_feed_name: String, group_name: String, key_field: Option<String>) -> Self {
        Self {
            group_name,
            key_field: key_field.unwrap_or_else(|| "id".to_string()),
        }
    }
}

impl Mapper<VulnDbRecord> for VulnDbMapper {
    fn map(&self, raw: &RawRecord) -> Result<VulnDbRecord, Error> {
        let id = raw
            .get(&self.key_field)
            .and_then(|value| value.as_str())
            .ok_or_else(|| Error::MissingField(self.key_field.clone()))?
            .to_string();
        Ok(VulnDbRecord {
            id,
            namespace_name: self.group_name.clone(),
            data: raw.clone(),
        })
    }
}

pub struct VulnDbRecordUpdater;

#[async_trait]
impl RecordUpdater<VulnDbRecord> for VulnDbRecordUpdater {
    async fn update(
        &self,
        txn: &DatabaseTransaction,
        record: VulnDbRecord,
    ) -> Result<Vec<uuid::Uuid>, Error> {
        let active = vulndb_metadata::ActiveModel {
            id: Set(record.id),
            namespace_name: Set(record.namespace_name),
            data: Set(record.data),
        };
        vulndb_metadata::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    vulndb_metadata::Column::Id,
                    vulndb_metadata::Column::NamespaceName,
                ])
                .update_column(vulndb_metadata::Column::Data)
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        Ok(Vec::new())
    }
}

pub struct VulnDbFlushStrategy;

#[async_trait]
impl FlushStrategy for VulnDbFlushStrategy {
    async fn flush(&self, txn: &DatabaseTransaction, group_name: &str) -> Result<(), Error> {
        vulndb_cpe::Entity::delete_many()
            .filter(vulndb_cpe::Column::NamespaceName.eq(group_name))
            .exec(txn)
            .await?;
        vulndb_metadata::Entity::delete_many()
            .filter(vulndb_metadata::Column::NamespaceName.eq(group_name))
            .exec(txn)
            .await?;
        Ok(())
    }
}

pub struct VulnDbRecordCounter;

#[async_trait]
impl RecordCounter for VulnDbRecordCounter {
    async fn count(&self, db: &DatabaseConnection, group_name: &str) -> Result<u64, Error> {
        let count = vulndb_metadata::Entity::find()
            .filter(vulndb_metadata::Column::NamespaceName.eq(group_name))
            .count(db)
            .await?;
        Ok(count)
    }
}
