//! The `packages` feed: two disjoint groups (`gem`, `npm`), each backed by
//! its own single-table entity rather than a shared generic row. One record
//! type spans both so the engine still only needs one `R`.

use crate::engine::{FlushStrategy, MappedRecord, RecordCounter, RecordUpdater};
use crate::mapper::{Mapper, NewMapper};
use crate::model::RawRecord;
use async_trait::async_trait;
use feedsync_common::Error;
use feedsync_entity::{gem_metadata, npm_metadata};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter,
};

#[derive(Clone, Debug)]
pub enum PackageRecord {
    Gem {
        name: String,
        latest: Option<String>,
        data: serde_json::Value,
    },
    Npm {
        name: String,
        latest: Option<String>,
        data: serde_json::Value,
    },
}

impl MappedRecord for PackageRecord {
    fn namespace_name(&self) -> &str {
        match self {
            PackageRecord::Gem { .. } => "gem",
            PackageRecord::Npm { .. } => "npm",
        }
    }

    fn id(&self) -> &str {
        match self {
            PackageRecord::Gem { name, .. } | PackageRecord::Npm { name, .. } => name,
        }
    }
}

fn read_name_and_latest(
    raw: &RawRecord,
    key_field: &str,
) -> Result<(String, Option<String>), Error> {
    let name = raw
        .get(key_field)
        .and_then(|value| value.as_str())
        .ok_or_else(|| Error::MissingField(key_field.to_string()))?
        .to_string();
    let latest = raw
        .get("latest")
        .and_then(|value| value.as_str())
        .map(str::to_string);
    Ok((name, latest))
}

pub struct GemMapper {
    key_field: String,
}

impl NewMapper<PackageRecord> for GemMapper {
    fn new(_feed_name: String, _group_name: String, key_field: Option<String>) -> Self {
        Self {
            key_field: key_field.unwrap_or_else(|| "name".to_string()),
        }
    }
}

impl Mapper<PackageRecord> for GemMapper {
    fn map(&self, raw: &RawRecord) -> Result<PackageRecord, Error> {
        let (name, latest) = read_name_and_latest(raw, &self.key_field)?;
        Ok(PackageRecord::Gem {
            name,
            latest,
            data: raw.clone(),
        })
    }
}

pub struct NpmMapper {
    key_field: String,
}

impl NewMapper<PackageRecord> for NpmMapper {
    fn new(_feed_name: String, _group_name: String, key_field: Option<String>) -> Self {
        Self {
            key_field: key_field.unwrap_or_else(|| "name".to_string()),
        }
    }
}

impl Mapper<PackageRecord> for NpmMapper {
    fn map(&self, raw: &RawRecord) -> Result<PackageRecord, Error> {
        let (name, latest) = read_name_and_latest(raw, &self.key_field)?;
        Ok(PackageRecord::Npm {
            name,
            latest,
            data: raw.clone(),
        })
    }
}

pub struct PackageRecordUpdater;

#[async_trait]
impl RecordUpdater<PackageRecord> for PackageRecordUpdater {
    async fn update(
        &self,
        txn: &DatabaseTransaction,
        record: PackageRecord,
    ) -> Result<Vec<uuid::Uuid>, Error> {
        match record {
            PackageRecord::Gem { name, latest, data } => {
                let active = gem_metadata::ActiveModel {
                    name: Set(name),
                    latest: Set(latest),
                    data: Set(data),
                };
                gem_metadata::Entity::insert(active)
                    .on_conflict(
                        OnConflict::column(gem_metadata::Column::Name)
                            .update_columns([gem_metadata::Column::Latest, gem_metadata::Column::Data])
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
            }
            PackageRecord::Npm { name, latest, data } => {
                let active = npm_metadata::ActiveModel {
                    name: Set(name),
                    latest: Set(latest),
                    data: Set(data),
                };
                npm_metadata::Entity::insert(active)
                    .on_conflict(
                        OnConflict::column(npm_metadata::Column::Name)
                            .update_columns([npm_metadata::Column::Latest, npm_metadata::Column::Data])
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
            }
        }

        Ok(Vec::new())
    }
}

pub struct PackageFlushStrategy;

#[async_trait]
impl FlushStrategy for PackageFlushStrategy {
    async fn flush(&self, txn: &DatabaseTransaction, group_name: &str) -> Result<(), Error> {
        match group_name {
            "gem" => {
                gem_metadata::Entity::delete_many().exec(txn).await?;
            }
            "npm" => {
                npm_metadata::Entity::delete_many().exec(txn).await?;
            }
            other => log::warn!("packages feed has no flush target for unknown group '{other}'"),
        }
        Ok(())
    }
}

pub struct PackageRecordCounter;

#[async_trait]
impl RecordCounter for PackageRecordCounter {
    async fn count(&self, db: &DatabaseConnection, group_name: &str) -> Result<u64, Error> {
        match group_name {
            "gem" => Ok(gem_metadata::Entity::find().count(db).await?),
            "npm" => Ok(npm_metadata::Entity::find().count(db).await?),
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gem_mapper_reads_name_and_latest() {
        let mapper = GemMapper::new("packages".into(), "gem".into(), None);
        let raw = serde_json::json!({"name": "rails", "latest": "7.1.0"});
        let mapped = mapper.map(&raw).unwrap();
        match mapped {
            PackageRecord::Gem { name, latest, .. } => {
                assert_eq!(name, "rails");
                assert_eq!(latest.as_deref(), Some("7.1.0"));
            }
            _ => panic!("expected Gem variant"),
        }
    }

    #[test]
    fn npm_mapper_rejects_missing_key_field() {
        let mapper = NpmMapper::new("packages".into(), "npm".into(), None);
        let raw = serde_json::json!({"latest": "1.0.0"});
        assert!(matches!(mapper.map(&raw), Err(Error::MissingField(_))));
    }

    #[rstest::rstest]
    #[case("pip")]
    #[case("cargo")]
    #[case("")]
    #[tokio::test]
    async fn unknown_group_is_a_no_op_not_an_error(#[case] group_name: &str) {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
        let count = PackageRecordCounter.count(&db, group_name).await.unwrap();
        assert_eq!(count, 0);

        let txn = sea_orm::TransactionTrait::begin(&db).await.unwrap();
        PackageFlushStrategy.flush(&txn, group_name).await.unwrap();
    }
}
