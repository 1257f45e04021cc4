//! Axum HTTP server handlers for the code exchange and refresh endpoints.

pub mod context;
mod handler_auth;
mod handler_refresh;
pub mod server;
mod utils_response;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::AppState;
pub use handler_auth::AuthRequest;
pub use server::build_router;
