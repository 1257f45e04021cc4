//! Main router configuration assembling the broker endpoints.

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::{context::AppState, handler_auth::handle_auth, handler_refresh::handle_refresh};

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    Router::new()
        .route("/auth", post(handle_auth))
        .route("/refresh", get(handle_refresh))
        .layer(cors_layer(&ctx))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Restrict cross-origin callers to the configured allow-list.
///
/// The layer answers every OPTIONS request on a route with 200 and an empty body.
fn cors_layer(ctx: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            ctx.config.allowed_origins.as_ref().iter().cloned(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    if *ctx.config.cors_allow_credentials.as_ref() {
        cors.allow_credentials(true)
    } else {
        cors
    }
}
