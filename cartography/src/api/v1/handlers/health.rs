use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub hub_base_url: String,
    pub loaded_graphs: usize,
}

/// `GET /api/v1/health`
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        hub_base_url: state.config.hub.base_url.clone(),
        loaded_graphs: state.loaded_graphs().await,
    })
}
