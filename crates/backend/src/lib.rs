use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;

use auth::AuthRuntime;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthRuntime>,
}

/// API routes, without the CORS and tracing layers added by the server.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/me", get(auth::auth_me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/session", get(auth::auth_session))
        .route("/api/auth/providers", get(auth::auth_providers))
        .route("/api/auth/signout", post(auth::auth_signout))
        .merge(protected)
        .with_state(state)
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}
