//! Row shapes for the feed-sync core.
//!
//! These are the persisted entities the sync engine reads, merges, and
//! deletes. Schema provisioning (migrations) is owned by the downstream
//! service and is out of scope here; this crate only describes the shape of
//! each row so the engine compiles and can be exercised against
//! [`sea_orm::MockDatabase`].

pub mod cpe_v2_vulnerability;
pub mod feed_group_metadata;
pub mod feed_metadata;
pub mod fixed_artifact;
pub mod gem_metadata;
pub mod generic_feed_data_record;
pub mod npm_metadata;
pub mod nvdv2_metadata;
pub mod vulndb_cpe;
pub mod vulndb_metadata;
pub mod vulnerability;
pub mod vulnerable_artifact;
