use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Edge, UserProfile};

/// Directed multigraph of user interactions.
///
/// Nodes keep insertion order and are addressed by identifier. Edges are an
/// append-only list; `pairs` indexes them by `(source, target)` so pair counts
/// do not scan the whole list.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    nodes: Vec<UserProfile>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    pairs: HashMap<(String, String), Vec<usize>>,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing the attributes of an existing node with the
    /// same id while keeping its original position.
    pub fn upsert_node(&mut self, profile: UserProfile) {
        match self.index.get(&profile.id) {
            Some(&pos) => self.nodes[pos] = profile,
            None => {
                self.index.insert(profile.id.clone(), self.nodes.len());
                self.nodes.push(profile);
            }
        }
    }

    /// Insert a node only when the id is unknown. Returns whether it was inserted.
    pub fn insert_node_if_absent(&mut self, profile: UserProfile) -> bool {
        if self.index.contains_key(&profile.id) {
            return false;
        }
        self.upsert_node(profile);
        true
    }

    /// Append an edge, creating bare nodes for unknown endpoints.
    pub fn add_edge(&mut self, edge: Edge) {
        for id in [&edge.source, &edge.target] {
            if !self.index.contains_key(id.as_str()) {
                self.upsert_node(UserProfile::bare(id.clone()));
            }
        }

        self.pairs
            .entry((edge.source.clone(), edge.target.clone()))
            .or_default()
            .push(self.edges.len());
        self.edges.push(edge);
    }

    pub fn node(&self, id: &str) -> Option<&UserProfile> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> &[UserProfile] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Parallel edges from `source` to `target`, in insertion order.
    pub fn edges_between(&self, source: &str, target: &str) -> impl Iterator<Item = &Edge> {
        self.pairs
            .get(&(source.to_string(), target.to_string()))
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Number of edges joining `a` and `b` in either direction.
    pub fn interaction_count(&self, a: &str, b: &str) -> usize {
        let forward = self.edges_between(a, b).count();
        if a == b {
            return forward;
        }
        forward + self.edges_between(b, a).count()
    }

    /// Smallest and largest edge timestamp; `(0, 0)` for an edgeless graph.
    pub fn timestamp_range(&self) -> (i64, i64) {
        let mut timestamps = self.edges.iter().map(|e| e.timestamp);
        match timestamps.next() {
            Some(first) => timestamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))),
            None => (0, 0),
        }
    }

    /// Graph restricted to `keep`, with every edge whose endpoints both survive.
    /// Node and edge order follow this graph.
    pub fn induced_subgraph(&self, keep: &HashSet<&str>) -> InteractionGraph {
        let mut sub = InteractionGraph::new();
        for node in self.nodes.iter().filter(|n| keep.contains(n.id.as_str())) {
            sub.upsert_node(node.clone());
        }
        for edge in &self.edges {
            if keep.contains(edge.source.as_str()) && keep.contains(edge.target.as_str()) {
                sub.add_edge(edge.clone());
            }
        }
        sub
    }

    /// Rebuild from node-link parts.
    pub fn from_parts(nodes: Vec<UserProfile>, links: Vec<Edge>) -> Self {
        let mut graph = InteractionGraph::new();
        for node in nodes {
            graph.upsert_node(node);
        }
        for link in links {
            graph.add_edge(link);
        }
        graph
    }
}

/// Node-link JSON encoding of a built graph, as persisted per graph key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    pub directed: bool,
    pub multigraph: bool,
    #[serde(default)]
    pub core_nodes: Vec<String>,
    pub nodes: Vec<UserProfile>,
    pub links: Vec<Edge>,
    pub min_timestamp: i64,
    pub max_timestamp: i64,
}
