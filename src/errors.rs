//! Standardized error types following the `error-broker-<domain>-<number>` format.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-broker-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when HTTP_PORT cannot be parsed
    #[error("error-broker-config-2 Parsing HTTP_PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-broker-config-3 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when duration string cannot be parsed
    #[error("error-broker-config-4 Failed to parse duration '{0}': {1}")]
    DurationParsingFailed(String, String),

    /// Error when boolean string cannot be parsed
    #[error(
        "error-broker-config-5 Failed to parse boolean '{0}': expected true/false/1/0/yes/no/on/off"
    )]
    BoolParsingFailed(String),

    /// Error when a configured URL cannot be parsed
    #[error("error-broker-config-6 Invalid URL for {0}: {1}")]
    UrlParsingFailed(String, url::ParseError),

    /// Error when a CORS origin is not a valid header value
    #[error("error-broker-config-7 Invalid allowed origin '{0}'")]
    InvalidOrigin(String),

    /// Error when the storage backend name is not recognized
    #[error("error-broker-config-8 Unknown storage backend: {0}")]
    UnknownStorageBackend(String),
}

/// Credential storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error when database connection fails
    #[error("error-broker-storage-1 Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Error when query execution fails
    #[error("error-broker-storage-2 Query execution failed: {0}")]
    QueryFailed(String),

    /// Error when data serialization fails
    #[error("error-broker-storage-3 Data serialization failed: {0}")]
    SerializationFailed(String),

    /// Error when the backing file cannot be read or written
    #[error("error-broker-storage-4 I/O error on {0}: {1}")]
    Io(String, std::io::Error),

    /// Error when stored data is invalid
    #[error("error-broker-storage-5 Invalid data: {0}")]
    InvalidData(String),

    /// Error when schema migration fails
    #[error("error-broker-storage-6 Migration failed: {0}")]
    MigrationFailed(String),
}

/// Failure reported by the provider's token endpoint, or by the transport in front of it.
///
/// `details` holds the provider's error body as JSON when it parses, otherwise the raw
/// text or a synthesized description. Callers pass it through to the HTTP response.
#[derive(Debug, Error)]
#[error("error-broker-upstream-1 Token endpoint responded {status_code}: {details}")]
pub struct UpstreamError {
    pub status_code: StatusCode,
    pub details: Value,
}

impl UpstreamError {
    /// Build an error from a non-success status and whatever body the provider sent.
    pub fn from_response_body(status_code: StatusCode, body: &str) -> Self {
        let details = if body.trim().is_empty() {
            Value::String(format!(
                "empty response body from token endpoint (status {})",
                status_code
            ))
        } else {
            serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_string()))
        };

        Self {
            status_code,
            details,
        }
    }

    /// Build an error for a request that never produced a usable response.
    pub fn transport(description: impl std::fmt::Display) -> Self {
        Self {
            status_code: StatusCode::BAD_GATEWAY,
            details: Value::String(format!("token endpoint request failed: {}", description)),
        }
    }

    /// Build an error for a 2xx response whose body is not a token response.
    pub fn malformed_success(body: &str, reason: impl std::fmt::Display) -> Self {
        let raw = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_string()))
        };

        Self {
            status_code: StatusCode::BAD_GATEWAY,
            details: serde_json::json!({
                "reason": format!("unexpected token endpoint response: {}", reason),
                "body": raw,
            }),
        }
    }
}
