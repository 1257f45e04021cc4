//! SQLite storage implementation
//!
//! SQLite is suitable for single-instance deployments and development.

mod credentials;

use crate::errors::StorageError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::str::FromStr;

pub use credentials::SqliteCredentialStore;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Connect to `database_url`, creating the database file if it does not exist,
/// and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqliteCredentialStore> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::ConnectionFailed(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .map_err(|e| StorageError::ConnectionFailed(format!("SQLite connection failed: {}", e)))?;

    let store = SqliteCredentialStore::new(pool);
    store.migrate().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::{CredentialRecord, CredentialStore};

    #[tokio::test]
    async fn test_connect_creates_database_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("broker.db").display());

        let store = connect(&url).await.unwrap();
        store
            .put_credential(&CredentialRecord::new("RT1", None))
            .await
            .unwrap();
        drop(store);

        let store = connect(&url).await.unwrap();
        let record = store.get_credential().await.unwrap().unwrap();
        assert_eq!(record.refresh_token, "RT1");
    }

    #[tokio::test]
    async fn test_connect_fails_when_database_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite:{}",
            dir.path().join("missing").join("broker.db").display()
        );

        let result = connect(&url).await;
        assert!(matches!(result, Err(StorageError::ConnectionFailed(_))));
    }
}
