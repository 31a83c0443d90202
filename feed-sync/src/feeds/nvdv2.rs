//! The `nvdv2` feed: CVE metadata plus a child table of CPE matches, deleted
//! together on a full flush (spec §4.5's entity-deletion table).

use crate::engine::{FlushStrategy, MappedRecord, RecordCounter, RecordUpdater};
use crate::mapper::{Mapper, NewMapper};
use crate::model::RawRecord;
use async_trait::async_trait;
use feedsync_common::Error;
use feedsync_entity::{cpe_v2_vulnerability, nvdv2_metadata};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter,
};

#[derive(Clone, Debug)]
pub struct NvdV2Record {
    pub id: String,
    pub namespace_name: String,
    pub data: serde_json::Value,
}

impl MappedRecord for NvdV2Record {
    fn namespace_name(&self) -> &str {
        &self.namespace_name
    }

    fn id(&self) -> &str {
        &self.id
    }
}

pub struct NvdV2Mapper {
    group_name: String,
    key_field: String,
}

impl NewMapper<NvdV2Record> for NvdV2Mapper {
    fn new(_feed_name: String, group_name: String, key_field: Option<String>) -> Self {
        Self {
            group_name,
            key_field: key_field.unwrap_or_else(|| "id".to_string()),
        }
    }
}

impl Mapper<NvdV2Record> for NvdV2Mapper {
    fn map(&self, raw: &RawRecord) -> Result<NvdV2Record, Error> {
        let id = raw
            .get(&self.key_field)
            .and_then(|value| value.as_str())
            .ok_or_else(|| Error::MissingField(self.key_field.clone()))?
            .to_string();
        Ok(NvdV2Record {
            id,
            namespace_name: self.group_name.clone(),
            data: raw.clone(),
        })
    }
}

pub struct NvdV2RecordUpdater;

#[async_trait]
impl RecordUpdater<NvdV2Record> for NvdV2RecordUpdater {
    async fn update(
        &self,
        txn: &DatabaseTransaction,
        record: NvdV2Record,
    ) -> Result<Vec<uuid::Uuid>, Error> {
        let active = nvdv2_metadata::ActiveModel {
            id: Set(record.id),
            namespace_name: Set(record.namespace_name),
            data: Set(record.data),
        };
        nvdv2_metadata::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    nvdv2_metadata::Column::Id,
                    nvdv2_metadata::Column::NamespaceName,
                ])
                .update_column(nvdv2_metadata::Column::Data)
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        Ok(Vec::new())
    }
}

pub struct NvdV2FlushStrategy;

#[async_trait]
impl FlushStrategy for NvdV2FlushStrategy {
    async fn flush(&self, txn: &DatabaseTransaction, group_name: &str) -> Result<(), Error> {
        cpe_v2_vulnerability::Entity::delete_many()
            .filter(cpe_v2_vulnerability::Column::NamespaceName.eq(group_name))
            .exec(txn)
            .await?;
        nvdv2_metadata::Entity::delete_many()
            .filter(nvdv2_metadata::Column::NamespaceName.eq(group_name))
            .exec(txn)
            .await?;
        Ok(())
    }
}

pub struct NvdV2RecordCounter;

#[async_trait]
impl RecordCounter for NvdV2RecordCounter {
    async fn count(&self, db: &DatabaseConnection, group_name: &str) -> Result<u64, Error> {
        let count = nvdv2_metadata::Entity::find()
            .filter(nvdv2_metadata::Column::NamespaceName.eq(group_name))
            .count(db)
            .await?;
        Ok(count)
    }
}
