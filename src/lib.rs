//! OAuth2 token broker library crate.
//!
//! Exchanges authorization codes with an identity provider, keeps the issued
//! refresh token server-side, and derives fresh access tokens from it on demand.

pub mod config;
pub mod errors;
pub mod http;
pub mod oauth;
pub mod storage;
