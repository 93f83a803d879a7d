use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EdgeType;

/// Render input for one cursor position. Every metric is final; consumers
/// must not recompute anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cursor: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_time: Option<DateTime<Utc>>,
    /// True at or before the first timestamp: only core nodes, no edges.
    pub initial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
}

impl Snapshot {
    pub fn node(&self, id: &str) -> Option<&SnapshotNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Aggregated edge between `a` and `b`, in either orientation.
    pub fn edge(&self, a: &str, b: &str) -> Option<&SnapshotEdge> {
        self.edges
            .iter()
            .find(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    pub label: String,
    pub size: f64,
    pub color: String,
    pub is_core: bool,
    /// `None` for core nodes.
    pub centrality: Option<f64>,
    /// `None` for core nodes.
    pub betweenness: Option<f64>,
    pub connected_core_nodes: usize,
    pub interactions_count: usize,
    pub on_path_to_core: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,
}

/// All interactions between one unordered pair of users up to the cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    /// Orientation of the first interaction seen for this pair.
    pub source: String,
    pub target: String,
    pub weight: usize,
    pub normalized_weight: f64,
    pub edge_types: BTreeMap<EdgeType, usize>,
    /// Per endpoint, the interaction types that endpoint initiated.
    pub interactions: BTreeMap<String, BTreeMap<EdgeType, usize>>,
    pub recency_highlight: bool,
    pub on_path_to_core: bool,
}
