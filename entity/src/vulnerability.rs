use sea_orm::entity::prelude::*;

/// A single vulnerability record within a namespace (feed group). Identity
/// is `(id, namespace_name)` — e.g. `("CVE-2023-1234", "debian:10")`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vulnerability")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub namespace_name: String,
    pub severity: String,
    pub description: Option<String>,
    pub data: serde_json::Value,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fixed_artifact::Entity")]
    FixedArtifact,
    #[sea_orm(has_many = "super::vulnerable_artifact::Entity")]
    VulnerableArtifact,
}

impl Related<super::fixed_artifact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FixedArtifact.def()
    }
}

impl Related<super::vulnerable_artifact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VulnerableArtifact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
