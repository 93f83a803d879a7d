use std::collections::{HashMap, HashSet};

use crate::models::InteractionGraph;

/// Minimum, over all core nodes, of the edges joining `node` to that core
/// node. Zero when there are no core nodes.
pub fn weakest_link<F>(node: &str, core: &[String], count: F) -> u64
where
    F: Fn(&str, &str) -> usize,
{
    core.iter()
        .map(|c| count(node, c.as_str()) as u64)
        .min()
        .unwrap_or(0)
}

/// Non-core candidates ordered by weakest-link score, highest first. Ties keep
/// the candidates' input order.
pub fn rank_by_weakest_link<'a, I, F>(candidates: I, core: &[String], count: F) -> Vec<(&'a str, u64)>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str, &str) -> usize,
{
    let mut ranked: Vec<(&str, u64)> = candidates
        .into_iter()
        .filter(|id| !core.iter().any(|c| c.as_str() == *id))
        .map(|id| (id, weakest_link(id, core, &count)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Weakest-link score of every non-core node.
pub fn score(graph: &InteractionGraph, core: &[String]) -> HashMap<String, u64> {
    graph
        .nodes()
        .iter()
        .filter(|n| !core.contains(&n.id))
        .map(|n| {
            let s = weakest_link(&n.id, core, |a, b| graph.interaction_count(a, b));
            (n.id.clone(), s)
        })
        .collect()
}

/// Keep the `top_n` best-scoring non-core nodes plus every core node.
pub fn filter(graph: &InteractionGraph, core: &[String], top_n: usize) -> InteractionGraph {
    let ranked = rank_by_weakest_link(
        graph.nodes().iter().map(|n| n.id.as_str()),
        core,
        |a, b| graph.interaction_count(a, b),
    );

    let mut keep: HashSet<&str> = ranked.iter().take(top_n).map(|(id, _)| *id).collect();
    keep.extend(core.iter().map(String::as_str));

    let filtered = graph.induced_subgraph(&keep);
    tracing::info!(
        before_nodes = graph.node_count(),
        after_nodes = filtered.node_count(),
        before_edges = graph.edge_count(),
        after_edges = filtered.edge_count(),
        top_n,
        "Filtered graph by relevance"
    );
    filtered
}
