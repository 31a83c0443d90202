use sea_orm::entity::prelude::*;

/// NVDv2-sourced CVE metadata, keyed `(id, namespace_name)` like
/// [`super::vulnerability`] but with its own entity family and flush path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "nvdv2_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub namespace_name: String,
    pub data: serde_json::Value,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cpe_v2_vulnerability::Entity")]
    CpeV2Vulnerability,
}

impl Related<super::cpe_v2_vulnerability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CpeV2Vulnerability.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
