//! OAuth2 grant and token types exchanged with the provider's token endpoint.

use serde::{Deserialize, Serialize};

/// OAuth2 Grant Types supported by the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exchange of a single-use authorization code.
#[derive(Clone, Serialize)]
pub struct AuthorizationCodeGrant {
    pub code: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Exchange of the stored refresh token for a new access token.
#[derive(Clone, Serialize)]
pub struct RefreshGrant {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// A grant sent to the token endpoint as an `application/x-www-form-urlencoded` body.
///
/// Serializes flat, with `grant_type` alongside the grant's own fields.
#[derive(Clone, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum TokenGrant {
    AuthorizationCode(AuthorizationCodeGrant),
    RefreshToken(RefreshGrant),
}

impl TokenGrant {
    pub fn grant_type(&self) -> GrantType {
        match self {
            TokenGrant::AuthorizationCode(_) => GrantType::AuthorizationCode,
            TokenGrant::RefreshToken(_) => GrantType::RefreshToken,
        }
    }
}

impl From<AuthorizationCodeGrant> for TokenGrant {
    fn from(grant: AuthorizationCodeGrant) -> Self {
        TokenGrant::AuthorizationCode(grant)
    }
}

impl From<RefreshGrant> for TokenGrant {
    fn from(grant: RefreshGrant) -> Self {
        TokenGrant::RefreshToken(grant)
    }
}

// Secrets stay out of logs and panics.
impl std::fmt::Debug for AuthorizationCodeGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCodeGrant")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for RefreshGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGrant")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenGrant::AuthorizationCode(grant) => grant.fmt(f),
            TokenGrant::RefreshToken(grant) => grant.fmt(f),
        }
    }
}

/// Successful token endpoint response.
///
/// `refresh_token` is only issued by the authorization code exchange.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenExchangeResult {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenExchangeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenExchangeResult")
            .field("expires_in", &self.expires_in)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Access token returned to the broker's callers. The refresh token never leaves the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

impl From<TokenExchangeResult> for AccessTokenResponse {
    fn from(result: TokenExchangeResult) -> Self {
        Self {
            access_token: result.access_token,
            expires_in: result.expires_in,
        }
    }
}
