pub mod chunk;
pub mod config;
pub mod error;

pub use chunk::ChunkedExt;
pub use config::SyncConfig;
pub use error::Error;
