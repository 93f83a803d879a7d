use axum::{
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;

pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/graphs", post(handlers::graphs::build_graph))
        .route(
            "/graphs/{graphKey}/snapshot",
            get(handlers::graphs::get_snapshot),
        )
}
