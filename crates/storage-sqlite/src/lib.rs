//! SQLite storage for account mappings and scalar sync state.

pub mod db;
pub mod errors;
pub mod mappings;
pub mod schema;
pub mod sync;

pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
pub use errors::StorageError;
pub use mappings::AccountMappingRepository;
pub use sync::SyncStateRepository;
