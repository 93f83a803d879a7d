use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{GraphConfig, StoreConfig};
use crate::error::{CartographyError, Result};
use crate::graph::{assemble, filter};
use crate::ingest::{UserAssembler, UserOutcome};
use crate::models::{NodeLinkDocument, UserRecord};
use crate::snapshot::GraphContext;
use crate::store::{self, BlobStore};

/// Upper bound on the configurable cache age (about a century).
const MAX_CACHE_AGE_SECS: u64 = 100 * 365 * 86_400;

/// What happened to one requested core id during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UserBuildStatus {
    /// Fetched from the hub. Non-empty `warnings` mean some data is partial.
    Fetched { warnings: Vec<String> },
    /// Reused a stored record younger than the cache age.
    Cached,
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBuildOutcome {
    pub id: String,
    #[serde(flatten)]
    pub status: UserBuildStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub graph_key: String,
    pub core_nodes: Vec<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub min_timestamp: i64,
    pub max_timestamp: i64,
    pub outcomes: Vec<UserBuildOutcome>,
}

impl BuildReport {
    pub fn skipped(&self) -> impl Iterator<Item = &UserBuildOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, UserBuildStatus::Skipped { .. }))
    }
}

/// Runs fetch, assembly and relevance filtering for a set of core ids, with
/// per-user records and the finished graph kept in a blob store.
pub struct BuildPipeline {
    assembler: UserAssembler,
    store: Arc<dyn BlobStore>,
    max_age: Duration,
    top_n: usize,
}

impl BuildPipeline {
    pub fn new(
        assembler: UserAssembler,
        store: Arc<dyn BlobStore>,
        store_config: &StoreConfig,
        graph_config: &GraphConfig,
    ) -> Self {
        Self {
            assembler,
            store,
            max_age: Duration::seconds(store_config.max_age_secs.min(MAX_CACHE_AGE_SECS) as i64),
            top_n: graph_config.top_n,
        }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Build and persist the graph for `core_ids`.
    ///
    /// A user that cannot be fetched is skipped and reported; the rest of the
    /// batch still builds.
    pub async fn build(
        &self,
        core_ids: &[String],
        top_n: Option<usize>,
    ) -> Result<(GraphContext, BuildReport)> {
        let core_ids = normalize_core_ids(core_ids)?;
        let top_n = top_n.unwrap_or(self.top_n);
        let graph_key = store::graph_key(&core_ids);

        info!("Building graph {} for {} core users", graph_key, core_ids.len());

        let mut records: Vec<UserRecord> = Vec::with_capacity(core_ids.len());
        let mut outcomes = Vec::with_capacity(core_ids.len());

        for id in &core_ids {
            if let Some(record) = self.cached_record(id).await {
                debug!("Using cached record for {}", id);
                records.push(record);
                outcomes.push(UserBuildOutcome {
                    id: id.clone(),
                    status: UserBuildStatus::Cached,
                });
                continue;
            }

            match self.assembler.build_user_record(id).await {
                UserOutcome::Assembled { record, warnings } => {
                    if warnings.is_empty() {
                        let key = store::user_record_key(id);
                        if let Err(e) = store::put_json(self.store.as_ref(), &key, &record).await {
                            warn!("Failed to store record for {}: {}", id, e);
                        }
                    } else {
                        warn!(
                            "Record for {} is incomplete, not caching it: {}",
                            id,
                            warnings.join("; ")
                        );
                    }
                    records.push(record);
                    outcomes.push(UserBuildOutcome {
                        id: id.clone(),
                        status: UserBuildStatus::Fetched { warnings },
                    });
                }
                UserOutcome::Skipped { id, reason } => {
                    warn!("Skipping user {}: {}", id, reason);
                    outcomes.push(UserBuildOutcome {
                        id,
                        status: UserBuildStatus::Skipped { reason },
                    });
                }
            }
        }

        let core_nodes: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
        let graph = assemble(&records);
        let filtered = filter(&graph, &core_nodes, top_n);
        let context = GraphContext::new(filtered, core_nodes);

        store::put_json(
            self.store.as_ref(),
            &store::graph_document_key(&graph_key),
            &context.to_document(),
        )
        .await?;

        let report = BuildReport {
            graph_key,
            core_nodes: context.core_nodes.clone(),
            node_count: context.graph.node_count(),
            edge_count: context.graph.edge_count(),
            min_timestamp: context.min_timestamp,
            max_timestamp: context.max_timestamp,
            outcomes,
        };

        info!(
            "Graph {} built: {} nodes, {} edges, {} users skipped",
            report.graph_key,
            report.node_count,
            report.edge_count,
            report.skipped().count()
        );

        Ok((context, report))
    }

    /// Load a previously built graph.
    pub async fn load(&self, graph_key: &str) -> Result<GraphContext> {
        let key = store::graph_document_key(graph_key);
        let document: NodeLinkDocument = store::get_json(self.store.as_ref(), &key)
            .await?
            .ok_or_else(|| CartographyError::NotFound(format!("Graph {graph_key} not found")))?;
        Ok(GraphContext::from_document(document))
    }

    /// Stored record for `id` if it is younger than the cache age.
    async fn cached_record(&self, id: &str) -> Option<UserRecord> {
        let key = store::user_record_key(id);

        let modified = match self.store.modified_at(&key).await {
            Ok(Some(modified)) => modified,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not stat cached record {}: {}", key, e);
                return None;
            }
        };
        if Utc::now() - modified > self.max_age {
            debug!("Cached record {} is stale", key);
            return None;
        }

        match store::get_json::<UserRecord>(self.store.as_ref(), &key).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable cached record {}: {}", key, e);
                None
            }
        }
    }
}

/// Trim, dedupe and validate requested ids, keeping the first occurrence.
pub fn normalize_core_ids(ids: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(ids.len());

    for raw in ids {
        let id = raw.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CartographyError::Validation(format!(
                "Invalid user id: {raw:?}"
            )));
        }
        if seen.insert(id.to_string()) {
            out.push(id.to_string());
        }
    }

    if out.is_empty() {
        return Err(CartographyError::Validation(
            "At least one core user id is required".to_string(),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_core_ids_dedupes_in_order() {
        let out = normalize_core_ids(&ids(&[" 2", "1", "2"])).unwrap();
        assert_eq!(out, ids(&["2", "1"]));
    }

    #[test]
    fn test_normalize_core_ids_rejects_bad_input() {
        assert!(matches!(
            normalize_core_ids(&[]),
            Err(CartographyError::Validation(_))
        ));
        assert!(normalize_core_ids(&ids(&["1", "../2"])).is_err());
        assert!(normalize_core_ids(&ids(&[""])).is_err());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = UserBuildOutcome {
            id: "7".to_string(),
            status: UserBuildStatus::Skipped {
                reason: "profile fetch failed".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "profile fetch failed");
    }
}
