//! Domain core of the Basiq -> Firefly III bridge: account mappings, ledger
//! gateway contracts and the incremental synchronization engine.

pub mod errors;
pub mod ledgers;
pub mod mappings;
pub mod sync;
pub mod utils;

pub use errors::{Error, Result};
