pub mod dto;
pub mod handlers;
pub mod response;
pub mod router;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::api::state::AppState;
    use crate::config::{Config, HubConfig};
    use crate::hub::HubClient;
    use crate::ingest::UserAssembler;
    use crate::models::{Edge, EdgeType, InteractionGraph, UserProfile};
    use crate::services::BuildPipeline;
    use crate::snapshot::GraphContext;
    use crate::store::{self, MemoryBlobStore};

    fn test_state(store: Arc<MemoryBlobStore>) -> AppState {
        let mut config = Config::default();
        config.hub = HubConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            api_base_url: "http://127.0.0.1:9/".to_string(),
            max_retries: 0,
            initial_backoff_ms: 1,
            request_delay_ms: 0,
            ..HubConfig::default()
        };

        let hub = HubClient::new(config.hub.clone()).unwrap();
        let pipeline = BuildPipeline::new(
            UserAssembler::new(hub),
            store,
            &config.store,
            &config.graph,
        );
        AppState::new(config, pipeline)
    }

    async fn seed_graph(store: &MemoryBlobStore) {
        let mut graph = InteractionGraph::new();
        graph.upsert_node(UserProfile::bare("1"));
        graph.add_edge(Edge::new("1", "2", 10, EdgeType::Liked));
        graph.add_edge(Edge::new("2", "1", 30, EdgeType::Replied));
        let context = GraphContext::new(graph, vec!["1".to_string()]);

        store::put_json(
            store,
            &store::graph_document_key("1"),
            &context.to_document(),
        )
        .await
        .unwrap();
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok_envelope() {
        let app = create_router(test_state(Arc::new(MemoryBlobStore::new())));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["loadedGraphs"], 0);
    }

    #[tokio::test]
    async fn snapshot_of_unknown_graph_is_not_found() {
        let app = create_router(test_state(Arc::new(MemoryBlobStore::new())));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/graphs/404/snapshot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn snapshot_defaults_to_latest_cursor() {
        let store = Arc::new(MemoryBlobStore::new());
        seed_graph(&store).await;
        let app = create_router(test_state(store));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/graphs/1/snapshot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["cursor"], 30);
        assert_eq!(json["data"]["edges"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["edges"][0]["weight"], 2);
    }

    #[tokio::test]
    async fn snapshot_cursor_wins_over_position() {
        let store = Arc::new(MemoryBlobStore::new());
        seed_graph(&store).await;
        let app = create_router(test_state(store));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/graphs/1/snapshot?cursor=10&position=100")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["cursor"], 10);
        assert_eq!(json["data"]["initial"], true);
    }

    #[tokio::test]
    async fn snapshot_rejects_unknown_selection() {
        let store = Arc::new(MemoryBlobStore::new());
        seed_graph(&store).await;
        let app = create_router(test_state(store));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/graphs/1/snapshot?selected=99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn build_rejects_invalid_ids() {
        let app = create_router(test_state(Arc::new(MemoryBlobStore::new())));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/graphs")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"coreIds": ["1", "../etc"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn build_rejects_empty_id_list() {
        let app = create_router(test_state(Arc::new(MemoryBlobStore::new())));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/graphs")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"coreIds": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_uses_envelope() {
        let app = create_router(test_state(Arc::new(MemoryBlobStore::new())));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v2/nothing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }
}
