//! Source ledger: Basiq open-banking API.

mod client;
pub mod types;

pub use client::{BasiqClient, DEFAULT_BASIQ_API_URL};
pub use types::{BasiqAccount, BasiqTransaction, BasiqUser};
