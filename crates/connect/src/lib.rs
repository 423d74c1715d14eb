//! REST clients for the source ledger (Basiq) and the target ledger
//! (Firefly III).

pub mod basiq;
pub mod error;
pub mod firefly;
mod http;

pub use basiq::BasiqClient;
pub use error::{ConnectError, Result};
pub use firefly::FireflyClient;
