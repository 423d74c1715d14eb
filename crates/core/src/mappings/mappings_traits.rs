use async_trait::async_trait;

use super::{AccountMapping, NewAccountMapping};
use crate::errors::Result;

/// Persistence contract for account mappings.
#[async_trait]
pub trait AccountMappingRepositoryTrait: Send + Sync {
    /// All mappings in a stable order (insertion order).
    fn list_mappings(&self) -> Result<Vec<AccountMapping>>;

    fn get_mapping(&self, source_account_id: &str) -> Result<Option<AccountMapping>>;

    /// Inserts the mapping, or overwrites target and label of the existing
    /// mapping for the same source account.
    async fn upsert_mapping(&self, mapping: NewAccountMapping) -> Result<AccountMapping>;
}

#[async_trait]
pub trait AccountMappingServiceTrait: Send + Sync {
    fn list_mappings(&self) -> Result<Vec<AccountMapping>>;

    fn get_mapping(&self, source_account_id: &str) -> Result<Option<AccountMapping>>;

    async fn upsert_mapping(&self, mapping: NewAccountMapping) -> Result<AccountMapping>;

    /// Upserts every entry that has a target; entries with an empty target are
    /// left unmapped.
    async fn upsert_mappings(
        &self,
        mappings: Vec<NewAccountMapping>,
    ) -> Result<Vec<AccountMapping>>;
}
