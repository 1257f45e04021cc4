//! PostgreSQL implementation for credential storage

use crate::errors::StorageError;
use crate::storage::traits::{CREDENTIAL_SLOT_ID, CredentialRecord, CredentialStore, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

/// PostgreSQL implementation of credential storage
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Create a new PostgreSQL credential store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Convert PostgreSQL row to CredentialRecord
    fn row_to_credential(row: &PgRow) -> Result<CredentialRecord> {
        Ok(CredentialRecord {
            refresh_token: row.try_get("refresh_token").map_err(|e| {
                StorageError::QueryFailed(format!("Failed to get refresh_token: {}", e))
            })?,
            user_id: row
                .try_get("user_id")
                .map_err(|e| StorageError::QueryFailed(format!("Failed to get user_id: {}", e)))?,
            updated_at: row.try_get("updated_at").map_err(|e| {
                StorageError::QueryFailed(format!("Failed to get updated_at: {}", e))
            })?,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn put_credential(&self, record: &CredentialRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO credentials (id, refresh_token, user_id, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                refresh_token = EXCLUDED.refresh_token,
                user_id = EXCLUDED.user_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(CREDENTIAL_SLOT_ID)
        .bind(&record.refresh_token)
        .bind(&record.user_id)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    async fn get_credential(&self) -> Result<Option<CredentialRecord>> {
        let row = sqlx::query(
            "SELECT refresh_token, user_id, updated_at FROM credentials WHERE id = $1",
        )
        .bind(CREDENTIAL_SLOT_ID)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        row.as_ref().map(Self::row_to_credential).transpose()
    }
}
