use std::collections::HashMap;

use rustworkx_core::centrality::betweenness_centrality;
use rustworkx_core::petgraph::algo::astar;
use rustworkx_core::petgraph::graph::{NodeIndex, UnGraph};

/// Above this many nodes betweenness runs on the rayon pool.
const PARALLEL_THRESHOLD: usize = 50;

/// Undirected simple graph over the active nodes of one snapshot.
pub(crate) struct Projection<'a> {
    graph: UnGraph<(), ()>,
    index: HashMap<&'a str, NodeIndex>,
    ids: Vec<&'a str>,
}

impl<'a> Projection<'a> {
    pub fn new<N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = &'a str>,
        E: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut graph = UnGraph::new_undirected();
        let mut index = HashMap::new();
        let mut ids = Vec::new();

        for id in nodes {
            if !index.contains_key(id) {
                index.insert(id, graph.add_node(()));
                ids.push(id);
            }
        }
        for (a, b) in edges {
            if a == b {
                continue;
            }
            if let (Some(&ia), Some(&ib)) = (index.get(a), index.get(b)) {
                graph.update_edge(ia, ib, ());
            }
        }

        Self { graph, index, ids }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.graph.contains_edge(ia, ib),
            _ => false,
        }
    }

    /// Degree over `n - 1`; a lone node scores 1.
    pub fn degree_centrality(&self) -> HashMap<&'a str, f64> {
        let n = self.node_count();
        self.ids
            .iter()
            .map(|&id| {
                let score = if n <= 1 {
                    1.0
                } else {
                    let degree = self.graph.neighbors(self.index[id]).count();
                    degree as f64 / (n - 1) as f64
                };
                (id, score)
            })
            .collect()
    }

    /// Normalized betweenness, endpoints excluded.
    pub fn betweenness(&self) -> HashMap<&'a str, f64> {
        if self.node_count() <= 2 {
            return self.ids.iter().map(|&id| (id, 0.0)).collect();
        }

        let scores = betweenness_centrality(&self.graph, false, true, PARALLEL_THRESHOLD);
        self.ids
            .iter()
            .map(|&id| {
                let raw = scores
                    .get(self.index[id].index())
                    .copied()
                    .flatten()
                    .unwrap_or(0.0);
                (id, if raw.is_finite() { raw } else { 0.0 })
            })
            .collect()
    }

    /// Fewest-hop path from `from` to `to`, both ends included.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<&'a str>> {
        let start = *self.index.get(from)?;
        let goal = *self.index.get(to)?;

        let (_, path) = astar(&self.graph, start, |n| n == goal, |_| 1u32, |_| 0u32)?;
        Some(path.into_iter().map(|n| self.ids[n.index()]).collect())
    }
}
