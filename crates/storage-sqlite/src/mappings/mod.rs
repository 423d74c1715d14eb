mod model;
mod repository;

pub use model::{AccountMappingDB, NewAccountMappingDB};
pub use repository::AccountMappingRepository;
