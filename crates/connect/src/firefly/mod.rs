//! Target ledger: Firefly III.

mod client;
pub mod types;

pub use client::FireflyClient;
pub use types::{FireflyAccount, FireflyTransactionSplit};
