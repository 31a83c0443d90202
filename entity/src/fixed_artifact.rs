use sea_orm::entity::prelude::*;

/// A `(name, epochless_version, version)` triple identifying a package and
/// version in which a vulnerability is fixed. The set of these per
/// vulnerability is exactly what match-equivalence compares.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fixed_artifact")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub vulnerability_id: String,
    pub namespace_name: String,
    pub name: String,
    pub epochless_version: String,
    pub version: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vulnerability::Entity",
        from = "(Column::VulnerabilityId, Column::NamespaceName)",
        to = "(super::vulnerability::Column::Id, super::vulnerability::Column::NamespaceName)"
    )]
    Vulnerability,
}

impl Related<super::vulnerability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vulnerability.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
