//! Incremental synchronization from the source ledger into the target ledger.

mod sync_model;
mod sync_scheduler;
mod sync_service;
mod sync_state_model;
mod sync_traits;
mod translator;
mod watermark;

pub use sync_model::*;
pub use sync_scheduler::*;
pub use sync_service::*;
pub use sync_state_model::*;
pub use sync_traits::*;
pub use translator::*;
pub use watermark::*;
