use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use super::{
    AccountMapping, AccountMappingRepositoryTrait, AccountMappingServiceTrait, NewAccountMapping,
};
use crate::errors::Result;

pub struct AccountMappingService {
    repository: Arc<dyn AccountMappingRepositoryTrait>,
}

impl AccountMappingService {
    pub fn new(repository: Arc<dyn AccountMappingRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AccountMappingServiceTrait for AccountMappingService {
    fn list_mappings(&self) -> Result<Vec<AccountMapping>> {
        self.repository.list_mappings()
    }

    fn get_mapping(&self, source_account_id: &str) -> Result<Option<AccountMapping>> {
        self.repository.get_mapping(source_account_id.trim())
    }

    async fn upsert_mapping(&self, mapping: NewAccountMapping) -> Result<AccountMapping> {
        let mapping = mapping.normalized()?;
        info!(
            "[Mappings] Mapping {} -> {} ({})",
            mapping.source_account_id, mapping.target_account_id, mapping.display_name
        );
        self.repository.upsert_mapping(mapping).await
    }

    async fn upsert_mappings(
        &self,
        mappings: Vec<NewAccountMapping>,
    ) -> Result<Vec<AccountMapping>> {
        let mut saved = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            if mapping.target_account_id.trim().is_empty() {
                debug!(
                    "[Mappings] Skipping {} without a target account",
                    mapping.source_account_id
                );
                continue;
            }
            saved.push(self.upsert_mapping(mapping).await?);
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryMappings {
        rows: Mutex<Vec<AccountMapping>>,
    }

    #[async_trait]
    impl AccountMappingRepositoryTrait for MemoryMappings {
        fn list_mappings(&self) -> Result<Vec<AccountMapping>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        fn get_mapping(&self, source_account_id: &str) -> Result<Option<AccountMapping>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.source_account_id == source_account_id)
                .cloned())
        }

        async fn upsert_mapping(&self, mapping: NewAccountMapping) -> Result<AccountMapping> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows
                .iter_mut()
                .find(|m| m.source_account_id == mapping.source_account_id)
            {
                row.target_account_id = mapping.target_account_id;
                row.display_name = mapping.display_name;
                return Ok(row.clone());
            }
            let row = AccountMapping {
                id: rows.len() as i32 + 1,
                source_account_id: mapping.source_account_id,
                target_account_id: mapping.target_account_id,
                display_name: mapping.display_name,
                created_at: String::new(),
                updated_at: String::new(),
            };
            rows.push(row.clone());
            Ok(row)
        }
    }

    #[tokio::test]
    async fn bulk_upsert_skips_entries_without_target() {
        let service = AccountMappingService::new(Arc::new(MemoryMappings::default()));
        let saved = service
            .upsert_mappings(vec![
                NewAccountMapping::new("A1", "F1", "Everyday"),
                NewAccountMapping::new("A2", "", "Savings"),
            ])
            .await
            .unwrap();

        assert_eq!(saved.len(), 1);
        assert_eq!(service.list_mappings().unwrap().len(), 1);
        assert!(service.get_mapping("A2").unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_normalizes_before_saving() {
        let service = AccountMappingService::new(Arc::new(MemoryMappings::default()));
        let saved = service
            .upsert_mapping(NewAccountMapping::new(" A1 ", "F1", ""))
            .await
            .unwrap();

        assert_eq!(saved.source_account_id, "A1");
        assert_eq!(saved.display_name, "A1");
        assert!(service.get_mapping(" A1").unwrap().is_some());
    }

    #[tokio::test]
    async fn upsert_rejects_empty_source() {
        let service = AccountMappingService::new(Arc::new(MemoryMappings::default()));
        let result = service
            .upsert_mapping(NewAccountMapping::new("  ", "F1", "x"))
            .await;
        assert!(result.is_err());
    }
}
