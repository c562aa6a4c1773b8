//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health checks (intentionally unauthenticated for load balancers/probes).
        // Both spellings are served; external monitors use either.
        .route("/healthcheck", get(handlers::health_check))
        .route("/health-check", get(handlers::health_check))
        // Repository metadata endpoints
        .route("/api/repository", post(handlers::save_repo))
        .route("/api/repository/by-url", get(handlers::get_repo_by_url))
        .route(
            "/api/repository/{repo_id}",
            get(handlers::get_repo).delete(handlers::delete_repo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
