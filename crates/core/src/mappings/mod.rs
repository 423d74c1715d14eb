//! Source-to-target account mappings.

mod mappings_model;
mod mappings_service;
mod mappings_traits;

pub use mappings_model::*;
pub use mappings_service::*;
pub use mappings_traits::*;
