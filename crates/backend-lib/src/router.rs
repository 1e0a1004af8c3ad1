// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP routes.
use crate::handlers::{health, login, logout, me, signup};
use crate::middleware::require_session;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
