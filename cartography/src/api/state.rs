use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::Result;
use crate::services::BuildPipeline;
use crate::snapshot::{GraphContext, SnapshotEngine};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<BuildPipeline>,
    pub engine: SnapshotEngine,
    /// Graphs already built or loaded in this process, by graph key.
    graphs: Arc<RwLock<HashMap<String, Arc<GraphContext>>>>,
}

impl AppState {
    pub fn new(config: Config, pipeline: BuildPipeline) -> Self {
        let engine = SnapshotEngine::new(config.visual.clone());
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            engine,
            graphs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Keep a freshly built graph around for snapshot requests.
    pub async fn remember(&self, graph_key: String, context: GraphContext) -> Arc<GraphContext> {
        let context = Arc::new(context);
        self.graphs.write().await.insert(graph_key, context.clone());
        context
    }

    pub async fn loaded_graphs(&self) -> usize {
        self.graphs.read().await.len()
    }

    /// Graph for `graph_key`, loading it from the store on first use.
    pub async fn graph(&self, graph_key: &str) -> Result<Arc<GraphContext>> {
        if let Some(context) = self.graphs.read().await.get(graph_key) {
            return Ok(context.clone());
        }

        let context = self.pipeline.load(graph_key).await?;
        tracing::debug!("Loaded graph {} from store", graph_key);
        Ok(self.remember(graph_key.to_string(), context).await)
    }
}
