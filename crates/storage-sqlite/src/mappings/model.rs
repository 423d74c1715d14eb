use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use fidi_core::mappings::AccountMapping;

#[derive(Queryable, Identifiable, Selectable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::account_mappings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountMappingDB {
    pub id: i32,
    pub source_account_id: String,
    pub target_account_id: String,
    pub display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::account_mappings)]
pub struct NewAccountMappingDB {
    pub source_account_id: String,
    pub target_account_id: String,
    pub display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AccountMappingDB> for AccountMapping {
    fn from(db: AccountMappingDB) -> Self {
        Self {
            id: db.id,
            source_account_id: db.source_account_id,
            target_account_id: db.target_account_id,
            display_name: db.display_name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
