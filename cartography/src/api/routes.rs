use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::v1;
use super::AppState;

/// Top-level router: the v1 graph API plus an enveloped 404 for anything else.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", v1::router::v1_router())
        .fallback(v1::handlers::route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
