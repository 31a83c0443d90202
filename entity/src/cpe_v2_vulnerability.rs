use sea_orm::entity::prelude::*;

/// CPE match data for an NVDv2 record, deleted alongside its parent
/// [`super::nvdv2_metadata`] row during a full flush.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cpe_v2_vulnerability")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub nvd_id: String,
    pub namespace_name: String,
    pub cpe: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::nvdv2_metadata::Entity",
        from = "(Column::NvdId, Column::NamespaceName)",
        to = "(super::nvdv2_metadata::Column::Id, super::nvdv2_metadata::Column::NamespaceName)"
    )]
    NvdV2Metadata,
}

impl Related<super::nvdv2_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NvdV2Metadata.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
