use sea_orm::entity::prelude::*;

/// Row shape for feeds that have no specialized entity family (the default
/// `AnchoreServiceFeed`/`ServiceFeed` path in the original source).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "generic_feed_data_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub namespace_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub data: serde_json::Value,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
