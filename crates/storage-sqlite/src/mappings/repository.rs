use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use fidi_core::mappings::{AccountMapping, AccountMappingRepositoryTrait, NewAccountMapping};
use fidi_core::Result;

use super::model::{AccountMappingDB, NewAccountMappingDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::account_mappings;

pub struct AccountMappingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountMappingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AccountMappingRepositoryTrait for AccountMappingRepository {
    fn list_mappings(&self) -> Result<Vec<AccountMapping>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = account_mappings::table
            .order(account_mappings::id.asc())
            .select(AccountMappingDB::as_select())
            .load::<AccountMappingDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(AccountMapping::from).collect())
    }

    fn get_mapping(&self, source_account_id: &str) -> Result<Option<AccountMapping>> {
        let mut conn = get_connection(&self.pool)?;
        let row = account_mappings::table
            .filter(account_mappings::source_account_id.eq(source_account_id))
            .select(AccountMappingDB::as_select())
            .first::<AccountMappingDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(AccountMapping::from))
    }

    async fn upsert_mapping(&self, mapping: NewAccountMapping) -> Result<AccountMapping> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AccountMapping> {
                let now = Utc::now().to_rfc3339();
                let row = NewAccountMappingDB {
                    source_account_id: mapping.source_account_id,
                    target_account_id: mapping.target_account_id,
                    display_name: mapping.display_name,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                };

                diesel::insert_into(account_mappings::table)
                    .values(&row)
                    .on_conflict(account_mappings::source_account_id)
                    .do_update()
                    .set((
                        account_mappings::target_account_id.eq(&row.target_account_id),
                        account_mappings::display_name.eq(&row.display_name),
                        account_mappings::updated_at.eq(&now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let saved = account_mappings::table
                    .filter(account_mappings::source_account_id.eq(&row.source_account_id))
                    .select(AccountMappingDB::as_select())
                    .first::<AccountMappingDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(saved.into())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    use crate::db::{create_pool, init, run_migrations, spawn_writer};

    fn setup() -> (AccountMappingRepository, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = init(dir.path().join("mappings.sqlite").to_str().unwrap()).unwrap();
        run_migrations(&db_path).unwrap();
        let pool = create_pool(&db_path).unwrap();
        let writer = spawn_writer(pool.as_ref().clone());
        (AccountMappingRepository::new(pool, writer), dir)
    }

    #[tokio::test]
    async fn upsert_overwrites_instead_of_duplicating() {
        let (repo, _dir) = setup();

        let first = repo
            .upsert_mapping(NewAccountMapping::new("A1", "F1", "Everyday"))
            .await
            .unwrap();
        let second = repo
            .upsert_mapping(NewAccountMapping::new("A1", "F9", "Bills"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.target_account_id, "F9");
        assert_eq!(second.display_name, "Bills");

        let all = repo.list_mappings().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].target_account_id, "F9");
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let (repo, _dir) = setup();
        for (source, target) in [("B", "F2"), ("A", "F1"), ("C", "F3")] {
            repo.upsert_mapping(NewAccountMapping::new(source, target, source))
                .await
                .unwrap();
        }
        repo.upsert_mapping(NewAccountMapping::new("B", "F22", "B"))
            .await
            .unwrap();

        let order: Vec<String> = repo
            .list_mappings()
            .unwrap()
            .into_iter()
            .map(|m| m.source_account_id)
            .collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn get_mapping_by_source_account() {
        let (repo, _dir) = setup();
        repo.upsert_mapping(NewAccountMapping::new("A1", "F1", "Everyday"))
            .await
            .unwrap();

        let found = repo.get_mapping("A1").unwrap().unwrap();
        assert_eq!(found.target_account_id, "F1");
        assert!(repo.get_mapping("missing").unwrap().is_none());
    }
}
