//! Ledger gateway contracts and the records exchanged through them.

mod ledgers_model;
mod ledgers_traits;

pub use ledgers_model::*;
pub use ledgers_traits::*;
