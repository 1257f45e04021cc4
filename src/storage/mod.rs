//! Trait-based credential storage with file, SQLite, and PostgreSQL backends.

pub mod file;
pub mod inmemory;
pub mod traits;

// Feature-gated storage implementations
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export commonly used types and traits
pub use file::FileCredentialStore;
pub use inmemory::MemoryCredentialStore;
pub use traits::*;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCredentialStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresCredentialStore;

use crate::errors::{ConfigError, StorageError};
use std::sync::Arc;

/// Default SQLite location when `DATABASE_URL` is not set
pub const DEFAULT_SQLITE_URL: &str = "sqlite:token-broker.db";

/// Storage backend configuration and factory
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    File(String), // Path to the JSON document
    #[cfg(feature = "sqlite")]
    Sqlite(String), // Connection string/path
    #[cfg(feature = "postgres")]
    Postgres(String), // Connection string
}

/// Open the configured backend, creating its medium if needed.
///
/// Fails if the medium can neither be opened nor created.
pub async fn create_storage_backend(
    backend: StorageBackend,
) -> std::result::Result<Arc<dyn CredentialStore>, StorageError> {
    match backend {
        StorageBackend::File(path) => {
            tracing::info!(%path, "opening file credential store");
            Ok(Arc::new(FileCredentialStore::open(path).await?))
        }
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite(database_url) => {
            tracing::info!("opening SQLite credential store");
            Ok(Arc::new(sqlite::connect(&database_url).await?))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres(database_url) => {
            tracing::info!("opening PostgreSQL credential store");
            Ok(Arc::new(postgres::connect(&database_url).await?))
        }
    }
}

/// Parse storage backend from configuration values
pub fn parse_storage_backend(
    backend_name: &str,
    database_url: Option<&str>,
    token_store_path: &str,
) -> std::result::Result<StorageBackend, ConfigError> {
    match backend_name {
        "file" => Ok(StorageBackend::File(token_store_path.to_string())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let url = database_url.unwrap_or(DEFAULT_SQLITE_URL);
            Ok(StorageBackend::Sqlite(url.to_string()))
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = database_url
                .ok_or_else(|| ConfigError::EnvVarRequired("DATABASE_URL".to_string()))?;
            Ok(StorageBackend::Postgres(url.to_string()))
        }
        _ => Err(ConfigError::UnknownStorageBackend(backend_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_backend() {
        let backend = parse_storage_backend("file", None, "/var/lib/broker.json").unwrap();
        assert_eq!(
            backend,
            StorageBackend::File("/var/lib/broker.json".to_string())
        );
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_parse_sqlite_backend_defaults_url() {
        let backend = parse_storage_backend("sqlite", None, "unused.json").unwrap();
        assert_eq!(backend, StorageBackend::Sqlite(DEFAULT_SQLITE_URL.to_string()));

        let backend =
            parse_storage_backend("sqlite", Some("sqlite:/data/x.db"), "unused.json").unwrap();
        assert_eq!(backend, StorageBackend::Sqlite("sqlite:/data/x.db".to_string()));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_parse_postgres_requires_url() {
        assert!(matches!(
            parse_storage_backend("postgres", None, "unused.json"),
            Err(ConfigError::EnvVarRequired(_))
        ));
    }

    #[test]
    fn test_parse_unknown_backend() {
        assert!(matches!(
            parse_storage_backend("memory", None, "unused.json"),
            Err(ConfigError::UnknownStorageBackend(name)) if name == "memory"
        ));
    }

    #[tokio::test]
    async fn test_create_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = create_storage_backend(StorageBackend::File(
            path.display().to_string(),
        ))
        .await
        .unwrap();

        store
            .put_credential(&CredentialRecord::new("RT1", None))
            .await
            .unwrap();
        assert_eq!(
            store.get_credential().await.unwrap().unwrap().refresh_token,
            "RT1"
        );
    }
}
