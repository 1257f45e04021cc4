//! SQLite implementation for credential storage

use crate::errors::StorageError;
use crate::storage::traits::{CREDENTIAL_SLOT_ID, CredentialRecord, CredentialStore, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

/// SQLite implementation of credential storage
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    /// Create a new SQLite credential store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Convert SQLite row to CredentialRecord
    fn row_to_credential(row: &SqliteRow) -> Result<CredentialRecord> {
        let updated_at_str: String = row
            .try_get("updated_at")
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get updated_at: {}", e)))?;
        let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| StorageError::InvalidData(format!("Invalid updated_at timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(CredentialRecord {
            refresh_token: row.try_get("refresh_token").map_err(|e| {
                StorageError::QueryFailed(format!("Failed to get refresh_token: {}", e))
            })?,
            user_id: row
                .try_get("user_id")
                .map_err(|e| StorageError::QueryFailed(format!("Failed to get user_id: {}", e)))?,
            updated_at,
        })
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn put_credential(&self, record: &CredentialRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO credentials (id, refresh_token, user_id, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                refresh_token = excluded.refresh_token,
                user_id = excluded.user_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(CREDENTIAL_SLOT_ID)
        .bind(&record.refresh_token)
        .bind(&record.user_id)
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    async fn get_credential(&self) -> Result<Option<CredentialRecord>> {
        let row = sqlx::query(
            "SELECT refresh_token, user_id, updated_at FROM credentials WHERE id = ?",
        )
        .bind(CREDENTIAL_SLOT_ID)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        row.as_ref().map(Self::row_to_credential).transpose()
    }
}
