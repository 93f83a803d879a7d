pub mod graphs;
pub(crate) mod health;

pub use health::health_check;

use crate::api::v1::response::{ApiResponse, ErrorCode};

/// Fallback for unknown paths, answered in the v1 envelope.
pub async fn route_not_found() -> ApiResponse<()> {
    ApiResponse::error(ErrorCode::NotFound, "No such route")
}
