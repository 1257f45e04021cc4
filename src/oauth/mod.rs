//! OAuth2 grant types and the upstream token endpoint client.

pub mod types;
pub mod upstream;

pub use types::{
    AccessTokenResponse, AuthorizationCodeGrant, GrantType, RefreshGrant, TokenExchangeResult,
    TokenGrant,
};
pub use upstream::{ReqwestUpstreamClient, UpstreamClient};
