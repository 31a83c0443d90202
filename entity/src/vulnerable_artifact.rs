use sea_orm::entity::prelude::*;

/// Analogous to [`super::fixed_artifact`] but for affected (not-yet-fixed)
/// ranges. Not part of match-equivalence in the current design — see
/// `DESIGN.md` for the open question this leaves on record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vulnerable_artifact")]
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
