//! Environment-based configuration types for the token broker runtime settings.

use anyhow::Result;
use http::HeaderValue;
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;

/// Token endpoint used when `TOKEN_ENDPOINT` is not set.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Origins allowed to call the broker when `ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://127.0.0.1:5500,https://shaharyemini.github.io";

/// HTTP server port configuration
#[derive(Clone, Debug)]
pub struct HttpPort(u16);

/// Certificate bundles for HTTPS connections
#[derive(Clone, Debug)]
pub struct CertificateBundles(Vec<String>);

/// HTTP client timeout configuration
#[derive(Clone, Debug)]
pub struct HttpClientTimeout(Duration);

/// Identity provider client secret. Never printed.
#[derive(Clone)]
pub struct ClientSecret(String);

/// Registered redirect URI sent with the authorization code grant.
///
/// Kept verbatim: providers compare it byte-for-byte with the registered value.
#[derive(Clone, Debug)]
pub struct RedirectUri(String);

/// Provider token endpoint
#[derive(Clone, Debug)]
pub struct TokenEndpoint(Url);

/// CORS origin allow-list
#[derive(Clone, Debug)]
pub struct AllowedOrigins(Vec<HeaderValue>);

/// Whether allowed origins may send credentials
#[derive(Clone, Debug)]
pub struct CorsAllowCredentials(bool);

/// Main application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub client_id: String,
    pub client_secret: ClientSecret,
    pub redirect_uri: RedirectUri,
    pub token_endpoint: TokenEndpoint,
    pub certificate_bundles: CertificateBundles,
    pub user_agent: String,
    pub http_client_timeout: HttpClientTimeout,
    pub storage_backend: String,
    pub database_url: Option<String>,
    pub token_store_path: String,
    pub allowed_origins: AllowedOrigins,
    pub cors_allow_credentials: CorsAllowCredentials,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::EnvVarRequired(name.to_string()).into())
        };
        let default = |name: &str, default_value: &str| -> String {
            lookup(name).unwrap_or_else(|| default_value.to_string())
        };

        let version = version()?;
        let client_id = require("CLIENT_ID")?;
        let client_secret = ClientSecret(require("CLIENT_SECRET")?);
        let redirect_uri: RedirectUri = require("REDIRECT_URI")?.try_into()?;
        let token_endpoint: TokenEndpoint =
            default("TOKEN_ENDPOINT", DEFAULT_TOKEN_ENDPOINT).try_into()?;
        let http_port: HttpPort = default("HTTP_PORT", "5000").try_into()?;
        let certificate_bundles: CertificateBundles = lookup("CERTIFICATE_BUNDLES").try_into()?;
        let default_user_agent = format!("token-broker/{}", version);
        let user_agent = default("USER_AGENT", &default_user_agent);
        let http_client_timeout: HttpClientTimeout =
            default("HTTP_CLIENT_TIMEOUT", "10s").try_into()?;
        let storage_backend = default("STORAGE_BACKEND", "sqlite");
        let database_url = lookup("DATABASE_URL").filter(|value| !value.is_empty());
        let token_store_path = default("TOKEN_STORE_PATH", "token-broker.json");
        let allowed_origins: AllowedOrigins =
            default("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS).try_into()?;
        let cors_allow_credentials: CorsAllowCredentials =
            default("CORS_ALLOW_CREDENTIALS", "false").try_into()?;

        Ok(Self {
            version,
            http_port,
            client_id,
            client_secret,
            redirect_uri,
            token_endpoint,
            certificate_bundles,
            user_agent,
            http_client_timeout,
            storage_backend,
            database_url,
            token_store_path,
            allowed_origins,
            cors_allow_credentials,
        })
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(5000))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<Option<String>> for CertificateBundles {
    type Error = anyhow::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        let value = value.unwrap_or_default();
        Ok(Self(
            value
                .split(';')
                .filter_map(|s| {
                    if s.is_empty() {
                        None
                    } else {
                        Some(s.to_string())
                    }
                })
                .collect::<Vec<String>>(),
        ))
    }
}

impl AsRef<Vec<String>> for CertificateBundles {
    fn as_ref(&self) -> &Vec<String> {
        &self.0
    }
}

impl TryFrom<String> for HttpClientTimeout {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(Duration::from_secs(10)));
        }
        let duration = duration_str::parse(&value)
            .map_err(|e| ConfigError::DurationParsingFailed(value, e.to_string()))?;
        Ok(Self(duration))
    }
}

impl AsRef<Duration> for HttpClientTimeout {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

impl ClientSecret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret([redacted])")
    }
}

impl From<String> for ClientSecret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl TryFrom<String> for RedirectUri {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Url::parse(&value)
            .map_err(|e| ConfigError::UrlParsingFailed("REDIRECT_URI".to_string(), e))?;
        Ok(Self(value))
    }
}

impl AsRef<str> for RedirectUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TokenEndpoint {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Url::parse(&value)
            .map(Self)
            .map_err(|e| ConfigError::UrlParsingFailed("TOKEN_ENDPOINT".to_string(), e).into())
    }
}

impl AsRef<Url> for TokenEndpoint {
    fn as_ref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for AllowedOrigins {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let origins = value
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                // The allow-list must name origins; CORS cannot combine `*` with a list
                if s == "*" {
                    return Err(ConfigError::InvalidOrigin(s.to_string()));
                }
                // Browsers send the origin without a trailing slash
                let origin = s.trim_end_matches('/');
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidOrigin(s.to_string()))
            })
            .collect::<Result<Vec<HeaderValue>, ConfigError>>()?;

        Ok(Self(origins))
    }
}

impl AsRef<Vec<HeaderValue>> for AllowedOrigins {
    fn as_ref(&self) -> &Vec<HeaderValue> {
        &self.0
    }
}

impl TryFrom<String> for CorsAllowCredentials {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Self(true)),
            "false" | "0" | "no" | "off" | "" => Ok(Self(false)),
            _ => Err(ConfigError::BoolParsingFailed(value).into()),
        }
    }
}

impl AsRef<bool> for CorsAllowCredentials {
    fn as_ref(&self) -> &bool {
        &self.0
    }
}
