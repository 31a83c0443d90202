use sea_orm::entity::prelude::*;

/// CPE match data for a VulnDB record, deleted alongside its parent
/// [`super::vulndb_metadata`] row during a full flush.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vulndb_cpe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub vulndb_id: String,
    pub namespace_name: String,
    pub cpe: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vulndb_metadata::Entity",
        from = "(Column::VulndbId, Column::NamespaceName)",
        to = "(super::vulndb_metadata::Column::Id, super::vulndb_metadata::Column::NamespaceName)"
    )]
    VulnDBMetadata,
}

impl Related<super::vulndb_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VulnDBMetadata.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
