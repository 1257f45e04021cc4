//! PostgreSQL storage implementation
//!
//! PostgreSQL is suitable for deployments where the credential must outlive the host.

mod credentials;

use crate::errors::StorageError;
use sqlx::postgres::PgPool;

pub use credentials::PostgresCredentialStore;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Connect to `database_url` and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<PostgresCredentialStore> {
    let pool = PgPool::connect(database_url).await.map_err(|e| {
        StorageError::ConnectionFailed(format!("PostgreSQL connection failed: {}", e))
    })?;

    let store = PostgresCredentialStore::new(pool);
    store.migrate().await?;
    Ok(store)
}
