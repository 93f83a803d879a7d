use std::collections::HashSet;

use crate::models::{InteractionGraph, NodeLinkDocument};

/// A built graph together with the core nodes it was built around.
///
/// Immutable once constructed; snapshots borrow it.
#[derive(Debug, Clone)]
pub struct GraphContext {
    pub graph: InteractionGraph,
    pub core_nodes: Vec<String>,
    pub min_timestamp: i64,
    pub max_timestamp: i64,
}

impl GraphContext {
    pub fn new(graph: InteractionGraph, core_nodes: Vec<String>) -> Self {
        let (min_timestamp, max_timestamp) = graph.timestamp_range();
        Self {
            graph,
            core_nodes,
            min_timestamp,
            max_timestamp,
        }
    }

    pub fn core_set(&self) -> HashSet<&str> {
        self.core_nodes.iter().map(String::as_str).collect()
    }

    /// Cursor for a slider position in `[0, 100]`, clamped to the range.
    pub fn cursor_at(&self, position: f64) -> i64 {
        let position = if position.is_finite() {
            position.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let span = (self.max_timestamp - self.min_timestamp) as f64;
        let cursor = self.min_timestamp + (position / 100.0 * span).round() as i64;
        cursor.clamp(self.min_timestamp, self.max_timestamp)
    }

    pub fn to_document(&self) -> NodeLinkDocument {
        NodeLinkDocument {
            directed: true,
            multigraph: true,
            core_nodes: self.core_nodes.clone(),
            nodes: self.graph.nodes().to_vec(),
            links: self.graph.edges().to_vec(),
            min_timestamp: self.min_timestamp,
            max_timestamp: self.max_timestamp,
        }
    }

    /// Restore a persisted graph. The stored range is kept as written.
    pub fn from_document(document: NodeLinkDocument) -> Self {
        Self {
            graph: InteractionGraph::from_parts(document.nodes, document.links),
            core_nodes: document.core_nodes,
            min_timestamp: document.min_timestamp,
            max_timestamp: document.max_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, EdgeType};

    fn context() -> GraphContext {
        let mut graph = InteractionGraph::new();
        graph.add_edge(Edge::new("1", "2", 100, EdgeType::Liked));
        graph.add_edge(Edge::new("2", "1", 300, EdgeType::Replied));
        GraphContext::new(graph, vec!["1".to_string(), "2".to_string()])
    }

    #[test]
    fn test_range_from_graph() {
        let ctx = context();
        assert_eq!((ctx.min_timestamp, ctx.max_timestamp), (100, 300));
        assert!(ctx.core_set().contains("2"));
        assert!(!ctx.core_set().contains("3"));
    }

    #[test]
    fn test_cursor_at_positions() {
        let ctx = context();
        assert_eq!(ctx.cursor_at(0.0), 100);
        assert_eq!(ctx.cursor_at(50.0), 200);
        assert_eq!(ctx.cursor_at(100.0), 300);
        assert_eq!(ctx.cursor_at(250.0), 300);
        assert_eq!(ctx.cursor_at(-3.0), 100);
        assert_eq!(ctx.cursor_at(f64::NAN), 100);
    }

    #[test]
    fn test_empty_graph_has_degenerate_range() {
        let ctx = GraphContext::new(InteractionGraph::new(), vec!["1".to_string()]);
        assert_eq!((ctx.min_timestamp, ctx.max_timestamp), (0, 0));
        assert_eq!(ctx.cursor_at(75.0), 0);
    }

    #[test]
    fn test_document_round_trip_preserves_order() {
        let ctx = context();
        let restored = GraphContext::from_document(ctx.to_document());

        assert_eq!(restored.graph.nodes(), ctx.graph.nodes());
        assert_eq!(restored.graph.edges(), ctx.graph.edges());
        assert_eq!(restored.core_nodes, ctx.core_nodes);
        assert_eq!(restored.max_timestamp, 300);
    }
}
