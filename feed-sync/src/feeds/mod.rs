//! Concrete feed capability sets. Each module here grounds
//! [`crate::engine::FeedCapabilities`] in a particular entity family;
//! the generic sync loop itself lives entirely in `engine.rs`.

pub mod generic;
pub mod nvdv2;
pub mod packages;
pub mod vulndb;
