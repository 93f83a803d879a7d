//! v1 Graph handlers.
//!
//! Building a graph runs the whole fetch pipeline synchronously and answers
//! with the build report; snapshots are computed per request from the
//! in-memory graph.

use axum::extract::{Path, Query, State};

use crate::api::v1::dto::{BuildGraphRequest, SnapshotQuery};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::services::BuildReport;
use crate::snapshot::Snapshot;

/// `POST /api/v1/graphs`
pub async fn build_graph(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<BuildGraphRequest>,
) -> ApiResponse<BuildReport> {
    if req.core_ids.is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "coreIds cannot be empty");
    }
    if req.top_n == Some(0) {
        return ApiResponse::error(ErrorCode::InvalidRequest, "topN must be positive");
    }

    let (context, report) = match state
        .pipeline
        .build(&req.core_id_strings(), req.top_n)
        .await
    {
        Ok(built) => built,
        Err(e) => return e.into(),
    };

    state.remember(report.graph_key.clone(), context).await;
    ApiResponse::created(report)
}

/// `GET /api/v1/graphs/{graphKey}/snapshot`
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(graph_key): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> ApiResponse<Snapshot> {
    let context = match state.graph(&graph_key).await {
        Ok(context) => context,
        Err(e) => return e.into(),
    };

    if let Some(position) = query.position {
        if !position.is_finite() {
            return ApiResponse::error(ErrorCode::InvalidRequest, "position must be a number");
        }
    }

    let cursor = match (query.cursor, query.position) {
        (Some(cursor), _) => cursor,
        (None, Some(position)) => context.cursor_at(position),
        (None, None) => context.max_timestamp,
    };

    let selected = query.selected.as_deref().filter(|s| !s.trim().is_empty());
    if let Some(id) = selected {
        if !context.graph.contains(id) {
            return ApiResponse::error(
                ErrorCode::NotFound,
                format!("Node {id} not found in graph {graph_key}"),
            );
        }
    }

    ApiResponse::success(state.engine.materialize(&context, cursor, selected))
}
