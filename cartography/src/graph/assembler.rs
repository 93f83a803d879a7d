use crate::models::{InteractionGraph, UserRecord};

/// Merge user records into one multigraph.
///
/// Nodes are placed first: every core profile overwrites, every connection
/// profile is inserted only when the id is new. Edges follow in record order,
/// so identical input always produces identical node and edge order.
pub fn assemble(records: &[UserRecord]) -> InteractionGraph {
    let mut graph = InteractionGraph::new();

    for record in records {
        graph.upsert_node(record.profile.clone());
        for connection in &record.connections_metadata {
            graph.insert_node_if_absent(connection.clone());
        }
    }
    let profiled = graph.node_count();

    for record in records {
        for edge in record.edges() {
            graph.add_edge(edge.clone());
        }
    }

    tracing::info!(
        records = records.len(),
        nodes = graph.node_count(),
        bare_nodes = graph.node_count() - profiled,
        edges = graph.edge_count(),
        "Assembled interaction graph"
    );

    graph
}
