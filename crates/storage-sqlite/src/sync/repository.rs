use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use fidi_core::sync::SyncStateRepositoryTrait;
use fidi_core::Result;

use super::model::KvStoreDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::kv_store;

/// Key/value store backing watermarks, the connected user and run status.
pub struct SyncStateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncStateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncStateRepositoryTrait for SyncStateRepository {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let value = kv_store::table
            .find(key)
            .select(kv_store::value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    async fn set_value(&self, key: String, value: String) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let row = KvStoreDB {
                    key,
                    value,
                    updated_at: Utc::now().to_rfc3339(),
                };

                diesel::insert_into(kv_store::table)
                    .values(&row)
                    .on_conflict(kv_store::key)
                    .do_update()
                    .set((
                        kv_store::value.eq(&row.value),
                        kv_store::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use fidi_core::sync::{watermark_key, LAST_RUN_STATUS_KEY};

    fn setup() -> (SyncStateRepository, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = init(dir.path().join("state.sqlite").to_str().unwrap()).unwrap();
        run_migrations(&db_path).unwrap();
        let pool = create_pool(&db_path).unwrap();
        let writer = spawn_writer(pool.as_ref().clone());
        (SyncStateRepository::new(pool, writer), dir)
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let (repo, _dir) = setup();
        assert_eq!(repo.get_value(&watermark_key("A1")).unwrap(), None);
    }

    #[tokio::test]
    async fn set_value_overwrites() {
        let (repo, _dir) = setup();
        let key = watermark_key("A1");

        repo.set_value(key.clone(), "2024-01-05".to_string())
            .await
            .unwrap();
        repo.set_value(key.clone(), "2024-01-06".to_string())
            .await
            .unwrap();

        assert_eq!(repo.get_value(&key).unwrap().as_deref(), Some("2024-01-06"));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (repo, _dir) = setup();
        repo.set_value(LAST_RUN_STATUS_KEY.to_string(), "Success: 3 transactions".to_string())
            .await
            .unwrap();
        repo.set_value(watermark_key("A1"), "2024-01-05".to_string())
            .await
            .unwrap();

        assert_eq!(
            repo.get_value(LAST_RUN_STATUS_KEY).unwrap().as_deref(),
            Some("Success: 3 transactions")
        );
        assert_eq!(
            repo.get_value(&watermark_key("A1")).unwrap().as_deref(),
            Some("2024-01-05")
        );
        assert_eq!(repo.get_value(&watermark_key("A2")).unwrap(), None);
    }
}
