//! The vulnerability feed's specialization (spec §4.4): on top of the
//! generic engine, every merge decides whether the change is
//! match-affecting before handing the record to the (external) image
//! re-matching collaborator, and the group-name cache is published for the
//! duration of the sync.

use crate::engine::{
    FlushStrategy, MappedRecord, RecordCounter, RecordUpdater, VulnerabilityHooks,
};
use crate::mapper::{Mapper, NewMapper};
use crate::model::{FixedIn, RawRecord};
use async_trait::async_trait;
use feedsync_common::{ChunkedExt, Error};
use feedsync_entity::{fixed_artifact, vulnerability, vulnerable_artifact};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// A vulnerability as merged from a raw feed record, prior to persistence.
#[derive(Clone, Debug)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub namespace_name: String,
    pub severity: String,
    pub description: Option<String>,
    pub fixed_in: HashSet<FixedIn>,
    /// Deliberately excluded from match-equivalence — see
    /// [`are_match_equivalent`] and `DESIGN.md`.
    pub vulnerable_in: HashSet<FixedIn>,
    pub data: serde_json::Value,
}

impl MappedRecord for VulnerabilityRecord {
    fn namespace_name(&self) -> &str {
        &self.namespace_name
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// A `(id, namespace_name, fixed_in)` snapshot, enough to decide
/// match-equivalence against a previously-persisted vulnerability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VulnerabilitySnapshot {
    pub id: String,
    pub namespace_name: String,
    pub fixed_in: HashSet<FixedIn>,
}

/// Two vulnerability snapshots are match-equivalent iff both are present,
/// share `(id, namespace_name)`, and their `fixed_in` sets have an empty
/// symmetric difference. `vulnerable_in` is never compared: preserved from
/// the original source, where affected-but-not-fixed ranges never drove
/// image re-matching (an inherited quirk, not a deliberate design — see
/// `DESIGN.md`).
pub fn are_match_equivalent(
    previous: Option<&VulnerabilitySnapshot>,
    next: Option<&VulnerabilitySnapshot>,
) -> bool {
    match (previous, next) {
        (Some(previous), Some(next)) => {
            previous.id == next.id
                && previous.namespace_name == next.namespace_name
                && previous.fixed_in.symmetric_difference(&next.fixed_in).next().is_none()
        }
        _ => false,
    }
}

fn strip_epoch(version: &str) -> String {
    match version.split_once(':') {
        Some((epoch, rest)) if epoch.chars().all(|c| c.is_ascii_digit()) && !epoch.is_empty() => {
            rest.to_string()
        }
        _ => version.to_string(),
    }
}

fn read_fixed_in_set(raw: &RawRecord, field: &str) -> HashSet<FixedIn> {
    raw.get(field)
        .and_then(|value| value.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let name = entry.get("Name")?.as_str()?.to_string();
                    let version = entry.get("Version")?.as_str()?.to_string();
                    let epochless_version = strip_epoch(&version);
                    Some(FixedIn {
                        name,
                        epochless_version,
                        version,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The vulnerabilities feed's one mapper type, keyed by `key_field`
/// (`"Name"` for the upstream vulnerability feeds), reading `FixedIn`/
/// `VulnerableIn` arrays and an optional `Severity`/`Description`.
pub struct VulnerabilityMapper {
    group_name: String,
    key_field: String,
}

impl NewMapper<VulnerabilityRecord> for VulnerabilityMapper {
    fn new(_feed_name: String, group_name: String, key_field: Option<String>) -> Self {
        Self {
            group_name,
            key_field: key_field.unwrap_or_else(|| "Name".to_string()),
        }
    }
}

impl Mapper<VulnerabilityRecord> for VulnerabilityMapper {
    fn map(&self, raw: &RawRecord) -> Result<VulnerabilityRecord, Error> {
        let id = raw
            .get(&self.key_field)
            .and_then(|value| value.as_str())
            .ok_or_else(|| Error::MissingField(self.key_field.clone()))?
            .to_string();

        let severity = raw
            .get("Severity")
            .and_then(|value| value.as_str())
            .unwrap_or("Unknown")
            .to_string();

        let description = raw
            .get("Description")
            .and_then(|value| value.as_str())
            .map(str::to_string);

        Ok(VulnerabilityRecord {
            id,
            namespace_name: self.group_name.clone(),
            severity,
            description,
            fixed_in: read_fixed_in_set(raw, "FixedIn"),
            vulnerable_in: read_fixed_in_set(raw, "VulnerableIn"),
            data: raw.clone(),
        })
    }
}

/// The external collaborator that recomputes image match state for a
/// vulnerability whose fix set changed. Fixed signature per `SPEC_FULL.md`
/// §6: no context parameter — the group-name cache exists precisely
/// because this call can't take one.
#[async_trait]
pub trait VulnerabilityProcessor: Send + Sync {
    async fn vulnerability_processing_fn(
        &self,
        txn: &DatabaseTransaction,
        vulnerability: &vulnerability::Model,
    ) -> Result<Vec<Uuid>, Error>;
}

async fn load_snapshot(
    txn: &DatabaseTransaction,
    id: &str,
    namespace_name: &str,
) -> Result<Option<VulnerabilitySnapshot>, Error> {
    let Some(existing) = vulnerability::Entity::find_by_id((id.to_string(), namespace_name.to_string()))
        .one(txn)
        .await?
    else {
        return Ok(None);
    };

    let fixed_in = fixed_artifact::Entity::find()
        .filter(
            Condition::all()
                .add(fixed_artifact::Column::VulnerabilityId.eq(id))
                .add(fixed_artifact::Column::NamespaceName.eq(namespace_name)),
        )
        .all(txn)
        .await?
        .into_iter()
        .map(|row| FixedIn {
            name: row.name,
            epochless_version: row.epochless_version,
            version: row.version,
        })
        .collect();

    Ok(Some(VulnerabilitySnapshot {
        id: existing.id,
        namespace_name: existing.namespace_name,
        fixed_in,
    }))
}

pub struct VulnerabilityRecordUpdater {
    processor: Arc<dyn VulnerabilityProcessor>,
}

impl VulnerabilityRecordUpdater {
    pub fn new(processor: Arc<dyn VulnerabilityProcessor>) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl RecordUpdater<VulnerabilityRecord> for VulnerabilityRecordUpdater {
    async fn update(
        &self,
        txn: &DatabaseTransaction,
        record: VulnerabilityRecord,
    ) -> Result<Vec<Uuid>, Error> {
        let previous = load_snapshot(txn, &record.id, &record.namespace_name).await?;

        let active = vulnerability::ActiveModel {
            id: Set(record.id.clone()),
            namespace_name: Set(record.namespace_name.clone()),
            severity: Set(record.severity.clone()),
            description: Set(record.description.clone()),
            data: Set(record.data.clone()),
        };
        vulnerability::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    vulnerability::Column::Id,
                    vulnerability::Column::NamespaceName,
                ])
                .update_columns([
                    vulnerability::Column::Severity,
                    vulnerability::Column::Description,
                    vulnerability::Column::Data,
                ])
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        replace_children::<fixed_artifact::Entity, _>(
            txn,
            &record.id,
            &record.namespace_name,
            &record.fixed_in,
            |id, namespace_name, entry: &FixedIn| fixed_artifact::ActiveModel {
                id: Set(Uuid::new_v4()),
                vulnerability_id: Set(id),
                namespace_name: Set(namespace_name),
                name: Set(entry.name.clone()),
                epochless_version: Set(entry.epochless_version.clone()),
                version: Set(entry.version.clone()),
            },
            fixed_artifact::Column::VulnerabilityId,
            fixed_artifact::Column::NamespaceName,
        )
        .await?;

        replace_children::<vulnerable_artifact::Entity, _>(
            txn,
            &record.id,
            &record.namespace_name,
            &record.vulnerable_in,
            |id, namespace_name, entry: &FixedIn| vulnerable_artifact::ActiveModel {
                id: Set(Uuid::new_v4()),
                vulnerability_id: Set(id),
                namespace_name: Set(namespace_name),
                name: Set(entry.name.clone()),
                epochless_version: Set(entry.epochless_version.clone()),
                version: Set(entry.version.clone()),
            },
            vulnerable_artifact::Column::VulnerabilityId,
            vulnerable_artifact::Column::NamespaceName,
        )
        .await?;

        let next = VulnerabilitySnapshot {
            id: record.id.clone(),
            namespace_name: record.namespace_name.clone(),
            fixed_in: record.fixed_in.clone(),
        };

        if are_match_equivalent(previous.as_ref(), Some(&next)) {
            return Ok(Vec::new());
        }

        let Some(persisted) = vulnerability::Entity::find_by_id((record.id, record.namespace_name))
            .one(txn)
            .await?
        else {
            return Ok(Vec::new());
        };

        self.processor
            .vulnerability_processing_fn(txn, &persisted)
            .await
    }
}

async fn replace_children<E, F>(
    txn: &DatabaseTransaction,
    vulnerability_id: &str,
    namespace_name: &str,
    rows: &HashSet<FixedIn>,
    build: F,
    id_column: E::Column,
    namespace_column: E::Column,
) -> Result<(), Error>
where
    E: EntityTrait,
    E::ActiveModel: sea_orm::ActiveModelTrait<Entity = E>,
    F: Fn(String, String, &FixedIn) -> E::ActiveModel,
{
    E::delete_many()
        .filter(
            Condition::all()
                .add(id_column.eq(vulnerability_id))
                .add(namespace_column.eq(namespace_name)),
        )
        .exec(txn)
        .await?;

    if rows.is_empty() {
        return Ok(());
    }

    let active_rows: Vec<E::ActiveModel> = rows
        .iter()
        .map(|row| build(vulnerability_id.to_string(), namespace_name.to_string(), row))
        .collect();

    // A vulnerability's fix set is attacker-controlled feed data; chunk the
    // insert so one record with an unreasonably large `FixedIn` list can't
    // build an oversized statement.
    for batch in active_rows.chunked(100) {
        E::insert_many(batch.to_vec()).exec_without_returning(txn).await?;
    }
    Ok(())
}

pub struct VulnerabilityFlushStrategy;

#[async_trait]
impl FlushStrategy for VulnerabilityFlushStrategy {
    async fn flush(&self, txn: &DatabaseTransaction, group_name: &str) -> Result<(), Error> {
        fixed_artifact::Entity::delete_many()
            .filter(fixed_artifact::Column::NamespaceName.eq(group_name))
            .exec(txn)
            .await?;
        vulnerable_artifact::Entity::delete_many()
            .filter(vulnerable_artifact::Column::NamespaceName.eq(group_name))
            .exec(txn)
            .await?;
        vulnerability::Entity::delete_many()
            .filter(vulnerability::Column::NamespaceName.eq(group_name))
            .exec(txn)
            .await?;
        Ok(())
    }
}

pub struct VulnerabilityRecordCounter;

#[async_trait]
impl RecordCounter for VulnerabilityRecordCounter {
    async fn count(&self, db: &DatabaseConnection, group_name: &str) -> Result<u64, Error> {
        let count = vulnerability::Entity::find()
            .filter(vulnerability::Column::NamespaceName.eq(group_name))
            .count(db)
            .await?;
        Ok(count)
    }
}

/// Convenience constructor for the full vulnerability feed capability set,
/// used by the registry's default wiring.
pub fn vulnerability_hooks() -> Arc<VulnerabilityHooks> {
    Arc::new(VulnerabilityHooks)
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixed(name: &str, version: &str) -> FixedIn {
        FixedIn {
            name: name.to_string(),
            epochless_version: version.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn no_previous_record_is_never_equivalent() {
        let next = VulnerabilitySnapshot {
            id: "CVE-2023-1234".into(),
            namespace_name: "debian:10".into(),
            fixed_in: HashSet::new(),
        };
        assert!(!are_match_equivalent(None, Some(&next)));
    }

    #[test]
    fn identical_fixed_in_sets_are_equivalent_regardless_of_order() {
        let previous = VulnerabilitySnapshot {
            id: "CVE-2023-1234".into(),
            namespace_name: "debian:10".into(),
            fixed_in: HashSet::from([fixed("openssl", "1.1.1"), fixed("curl", "7.68.0")]),
        };
        let next = VulnerabilitySnapshot {
            id: "CVE-2023-1234".into(),
            namespace_name: "debian:10".into(),
            fixed_in: HashSet::from([fixed("curl", "7.68.0"), fixed("openssl", "1.1.1")]),
        };
        assert!(are_match_equivalent(Some(&previous), Some(&next)));
    }

    #[test]
    fn a_changed_fix_set_is_not_equivalent() {
        let previous = VulnerabilitySnapshot {
            id: "CVE-2023-1234".into(),
            namespace_name: "debian:10".into(),
            fixed_in: HashSet::from([fixed("openssl", "1.1.1")]),
        };
        let next = VulnerabilitySnapshot {
            id: "CVE-2023-1234".into(),
            namespace_name: "debian:10".into(),
            fixed_in: HashSet::from([fixed("openssl", "1.1.1n")]),
        };
        assert!(!are_match_equivalent(Some(&previous), Some(&next)));
    }

    #[test]
    fn strips_numeric_epoch_prefix() {
        assert_eq!(strip_epoch("1:2.3.4-1"), "2.3.4-1");
        assert_eq!(strip_epoch("2.3.4-1"), "2.3.4-1");
        assert_eq!(strip_epoch("nonnumeric:2.3.4"), "nonnumeric:2.3.4");
    }

    #[test]
    fn mapper_reads_fixed_in_and_defaults_severity() {
        let mapper = VulnerabilityMapper::new("vulnerabilities".into(), "debian:10".into(), None);
        let raw = serde_json::json!({
            "Name": "CVE-2023-1234",
            "FixedIn": [{"Name": "openssl", "Version": "1.1.1n"}],
        });
        let record = mapper.map(&raw).unwrap();
        assert_eq!(record.id, "CVE-2023-1234");
        assert_eq!(record.severity, "Unknown");
        assert_eq!(record.fixed_in.len(), 1);
    }
}
