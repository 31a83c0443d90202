use sea_orm::entity::prelude::*;

/// VulnDB-sourced record, keyed `(id, namespace_name)`, served from the
/// on-prem enterprise feed service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vulndb_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub namespace_name: String,
    pub data: serde_json::Value,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vulndb_cpe::Entity")]
    VulnDBCpe,
}

impl Related<super::vulndb_cpe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VulnDBCpe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
