use sea_orm::entity::prelude::*;

/// One group within a feed (e.g. `debian:10`, `npm`). `last_sync` advances
/// only after every record in a sync's manifest has been merged and
/// committed; it is monotonically non-decreasing across successful syncs.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feed_group_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub feed_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub last_sync: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::feed_metadata::Entity",
        from = "Column::FeedName",
        to = "super::feed_metadata::Column::Name"
    )]
    Feed,
}

impl Related<super::feed_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feed.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
