//! SQLite persistence for watermarks and run status.

mod model;
mod repository;

pub use model::KvStoreDB;
pub use repository::SyncStateRepository;
