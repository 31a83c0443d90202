use sea_orm::entity::prelude::*;

/// Per-feed bookkeeping: when it was last touched by a sync, and whether
/// that sync was a full flush-and-reload.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feed_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub last_update: Option<DateTimeUtc>,
    pub last_full_sync: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::feed_group_metadata::Entity")]
    Group,
}

impl Related<super::feed_group_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
