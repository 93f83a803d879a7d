use std::collections::{BTreeMap, HashMap, HashSet};

use super::context::GraphContext;
use super::model::{Snapshot, SnapshotEdge, SnapshotNode};
use super::projection::Projection;
use crate::config::VisualConfig;
use crate::graph::rank_by_weakest_link;
use crate::models::{network_time, EdgeType, UserProfile};

const CORE_COLOR: &str = "rgb(0, 255, 0)";

/// Linear map of `value` from `[min, max]` onto `[new_min, new_max]`.
/// A degenerate source range maps to `new_min`.
pub fn normalize_value(value: f64, min: f64, max: f64, new_min: f64, new_max: f64) -> f64 {
    if max == min {
        return new_min;
    }
    (value - min) / (max - min) * (new_max - new_min) + new_min
}

/// Materializes the graph as it stood at a given cursor.
#[derive(Debug, Clone, Default)]
pub struct SnapshotEngine {
    visual: VisualConfig,
}

struct Aggregate<'a> {
    source: &'a str,
    target: &'a str,
    weight: usize,
    edge_types: BTreeMap<EdgeType, usize>,
    interactions: BTreeMap<String, BTreeMap<EdgeType, usize>>,
}

fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl SnapshotEngine {
    pub fn new(visual: VisualConfig) -> Self {
        Self { visual }
    }

    /// Cumulative view of `ctx` as of `cursor`, optionally highlighting the
    /// shortest paths from `selected` to every core node.
    ///
    /// Edges after the cursor take no part in any metric.
    pub fn materialize(&self, ctx: &GraphContext, cursor: i64, selected: Option<&str>) -> Snapshot {
        let core = ctx.core_set();

        let mut active: HashSet<&str> = core.clone();
        let mut interactions: HashMap<&str, usize> = HashMap::new();
        let mut aggregates: Vec<Aggregate> = Vec::new();
        let mut pair_index: HashMap<(&str, &str), usize> = HashMap::new();

        for edge in ctx.graph.edges().iter().filter(|e| e.timestamp <= cursor) {
            let (source, target) = (edge.source.as_str(), edge.target.as_str());
            active.insert(source);
            active.insert(target);
            *interactions.entry(source).or_default() += 1;
            *interactions.entry(target).or_default() += 1;

            if source == target {
                continue;
            }

            let key = pair_key(source, target);
            match pair_index.get(&key) {
                Some(&i) => {
                    let agg = &mut aggregates[i];
                    agg.weight += 1;
                    *agg.edge_types.entry(edge.edge_type).or_default() += 1;
                    *agg
                        .interactions
                        .entry(source.to_string())
                        .or_default()
                        .entry(edge.edge_type)
                        .or_default() += 1;
                }
                None => {
                    let mut per_endpoint = BTreeMap::new();
                    per_endpoint.insert(source.to_string(), BTreeMap::from([(edge.edge_type, 1)]));
                    per_endpoint.insert(target.to_string(), BTreeMap::new());

                    pair_index.insert(key, aggregates.len());
                    aggregates.push(Aggregate {
                        source,
                        target,
                        weight: 1,
                        edge_types: BTreeMap::from([(edge.edge_type, 1)]),
                        interactions: per_endpoint,
                    });
                }
            }
        }

        // Core nodes first in the order given, then the rest in graph order.
        let mut order: Vec<&str> = Vec::with_capacity(active.len());
        for id in &ctx.core_nodes {
            if !order.contains(&id.as_str()) {
                order.push(id.as_str());
            }
        }
        order.extend(
            ctx.graph
                .nodes()
                .iter()
                .map(|n| n.id.as_str())
                .filter(|id| active.contains(id) && !core.contains(id)),
        );

        let projection = Projection::new(
            order.iter().copied(),
            aggregates.iter().map(|a| (a.source, a.target)),
        );
        let degree = projection.degree_centrality();
        let betweenness = projection.betweenness();
        let max_betweenness = betweenness.values().copied().fold(0.0_f64, f64::max);
        let max_interactions = order
            .iter()
            .map(|id| interactions.get(id).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);

        let recent = self.recently_surfaced(ctx, cursor, &order, &pair_index, &aggregates);

        let (path_nodes, path_edges) = match selected {
            Some(sel) if active.contains(sel) => {
                let mut nodes: HashSet<&str> = HashSet::new();
                let mut edges: HashSet<(&str, &str)> = HashSet::new();
                for core_id in &ctx.core_nodes {
                    if let Some(path) = projection.shortest_path(sel, core_id) {
                        for pair in path.windows(2) {
                            edges.insert(pair_key(pair[0], pair[1]));
                        }
                        nodes.extend(path);
                    }
                }
                (nodes, edges)
            }
            _ => (HashSet::new(), HashSet::new()),
        };

        let initial = cursor <= ctx.min_timestamp;

        let nodes: Vec<SnapshotNode> = order
            .iter()
            .filter(|id| !initial || core.contains(*id))
            .map(|&id| {
                let is_core = core.contains(id);
                let count = interactions.get(id).copied().unwrap_or(0);
                let b = betweenness.get(id).copied().unwrap_or(0.0);
                let bare;
                let profile = match ctx.graph.node(id) {
                    Some(profile) => profile,
                    None => {
                        bare = UserProfile::bare(id);
                        &bare
                    }
                };

                SnapshotNode {
                    id: id.to_string(),
                    label: profile.label().to_string(),
                    size: self.node_size(count, max_interactions),
                    color: if is_core {
                        CORE_COLOR.to_string()
                    } else {
                        betweenness_color(b, max_betweenness)
                    },
                    is_core,
                    centrality: (!is_core).then(|| degree.get(id).copied().unwrap_or(0.0)),
                    betweenness: (!is_core).then_some(b),
                    connected_core_nodes: ctx
                        .core_nodes
                        .iter()
                        .filter(|c| projection.has_edge(id, c))
                        .count(),
                    interactions_count: count,
                    on_path_to_core: path_nodes.contains(id),
                    username: profile.username.clone(),
                    display_name: profile.display_name.clone(),
                    bio: profile.bio.clone(),
                    pfp_url: profile.pfp_url.clone(),
                    follower_count: profile.follower_count,
                    following_count: profile.following_count,
                }
            })
            .collect();

        let edges: Vec<SnapshotEdge> = if initial {
            Vec::new()
        } else {
            let max_weight = aggregates.iter().map(|a| a.weight).max().unwrap_or(1);
            aggregates
                .into_iter()
                .map(|agg| {
                    let key = pair_key(agg.source, agg.target);
                    let recency_highlight = (recent.contains(agg.source) && core.contains(agg.target))
                        || (recent.contains(agg.target) && core.contains(agg.source));
                    SnapshotEdge {
                        source: agg.source.to_string(),
                        target: agg.target.to_string(),
                        weight: agg.weight,
                        normalized_weight: normalize_value(
                            agg.weight as f64,
                            1.0,
                            max_weight as f64,
                            self.visual.min_edge_width,
                            self.visual.max_edge_width,
                        ),
                        edge_types: agg.edge_types,
                        interactions: agg.interactions,
                        recency_highlight,
                        on_path_to_core: path_edges.contains(&key),
                    }
                })
                .collect()
        };

        tracing::debug!(
            cursor,
            initial,
            nodes = nodes.len(),
            edges = edges.len(),
            selected = selected.unwrap_or(""),
            "Materialized snapshot"
        );

        Snapshot {
            cursor,
            cursor_time: network_time(cursor),
            initial,
            selected: selected.map(str::to_string),
            nodes,
            edges,
        }
    }

    /// Base size scaled by interaction volume relative to the busiest node.
    /// Core and non-core nodes scale alike.
    fn node_size(&self, interactions: usize, max_interactions: usize) -> f64 {
        if max_interactions == 0 {
            return self.visual.node_base_size;
        }
        self.visual.node_base_size * (1.0 + interactions as f64 / max_interactions as f64)
    }

    /// The top-N non-core nodes by weakest-link strength over active edges,
    /// with N growing from 1 to the recency cap as the cursor advances.
    fn recently_surfaced<'a>(
        &self,
        ctx: &GraphContext,
        cursor: i64,
        order: &[&'a str],
        pair_index: &HashMap<(&str, &str), usize>,
        aggregates: &[Aggregate],
    ) -> HashSet<&'a str> {
        let cap = self.visual.recency_cap;
        let scaled = normalize_value(
            cursor as f64,
            ctx.min_timestamp as f64,
            ctx.max_timestamp as f64,
            1.0,
            cap as f64,
        )
        .floor();
        let n = if scaled >= 1.0 {
            (scaled as usize).min(cap)
        } else {
            0
        };

        let strength = |a: &str, b: &str| {
            pair_index
                .get(&pair_key(a, b))
                .map(|&i| aggregates[i].weight)
                .unwrap_or(0)
        };

        rank_by_weakest_link(order.iter().copied(), &ctx.core_nodes, strength)
            .into_iter()
            .take(n)
            .map(|(id, _)| id)
            .collect()
    }
}

fn betweenness_color(betweenness: f64, max_betweenness: f64) -> String {
    if max_betweenness > 0.0 {
        let red = (255.0 * betweenness / max_betweenness).clamp(0.0, 255.0) as u8;
        format!("rgb({red}, 0, 255)")
    } else {
        "rgb(0, 0, 255)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, InteractionGraph};
    use pretty_assertions::assert_eq;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn scenario() -> GraphContext {
        let mut graph = InteractionGraph::new();
        graph.add_edge(Edge::new("1", "2", 10, EdgeType::Liked));
        graph.add_edge(Edge::new("2", "1", 20, EdgeType::Replied));
        graph.add_edge(Edge::new("1", "3", 5, EdgeType::Follows));
        GraphContext::new(graph, ids(&["1", "2"]))
    }

    fn node_ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(1.0, 1.0, 1.0, 1.5, 15.0), 1.5);
        assert_eq!(normalize_value(3.0, 1.0, 3.0, 1.5, 15.0), 15.0);
        assert_eq!(normalize_value(2.0, 1.0, 3.0, 0.0, 10.0), 5.0);
    }

    #[test]
    fn test_initial_cursor_shows_only_core() {
        let ctx = scenario();
        let snapshot = SnapshotEngine::default().materialize(&ctx, 5, None);

        assert!(snapshot.initial);
        assert_eq!(node_ids(&snapshot), vec!["1", "2"]);
        assert!(snapshot.edges.is_empty());
    }

    #[test]
    fn test_mid_cursor_aggregates_visible_edges() {
        let ctx = scenario();
        let snapshot = SnapshotEngine::default().materialize(&ctx, 10, None);

        assert!(!snapshot.initial);
        assert_eq!(node_ids(&snapshot), vec!["1", "2", "3"]);
        assert_eq!(snapshot.edges.len(), 2);
        assert_eq!(snapshot.edge("1", "3").unwrap().weight, 1);
        assert_eq!(snapshot.edge("1", "2").unwrap().weight, 1);
    }

    #[test]
    fn test_unordered_pair_aggregation() {
        let ctx = scenario();
        let snapshot = SnapshotEngine::default().materialize(&ctx, 20, None);
        let edge = snapshot.edge("1", "2").unwrap();

        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("1", "2"));
        assert_eq!(edge.weight, 2);
        assert_eq!(
            edge.edge_types,
            BTreeMap::from([(EdgeType::Liked, 1), (EdgeType::Replied, 1)])
        );
        assert_eq!(edge.interactions["1"], BTreeMap::from([(EdgeType::Liked, 1)]));
        assert_eq!(edge.interactions["2"], BTreeMap::from([(EdgeType::Replied, 1)]));
        assert_eq!(edge.normalized_weight, 15.0);
        assert_eq!(snapshot.edge("1", "3").unwrap().normalized_weight, 1.5);
    }

    #[test]
    fn test_self_edge_counts_but_is_not_drawn() {
        let mut graph = InteractionGraph::new();
        graph.add_edge(Edge::new("1", "2", 1, EdgeType::Liked));
        graph.add_edge(Edge::new("1", "1", 2, EdgeType::Replied));
        let ctx = GraphContext::new(graph, ids(&["1"]));

        let snapshot = SnapshotEngine::default().materialize(&ctx, 2, None);
        assert_eq!(snapshot.edges.len(), 1);
        assert!(snapshot.edges.iter().all(|e| e.source != e.target));
        assert_eq!(snapshot.node("1").unwrap().interactions_count, 3);
    }

    #[test]
    fn test_cursor_monotonicity() {
        let mut graph = InteractionGraph::new();
        for (i, (s, t)) in [("1", "4"), ("2", "4"), ("4", "5"), ("1", "2"), ("5", "2")]
            .into_iter()
            .enumerate()
        {
            graph.add_edge(Edge::new(s, t, i as i64 * 10, EdgeType::Liked));
        }
        let ctx = GraphContext::new(graph, ids(&["1", "2"]));
        let engine = SnapshotEngine::default();

        let mut previous: Option<Snapshot> = None;
        for cursor in [1, 10, 25, 30, 40, 100] {
            let snapshot = engine.materialize(&ctx, cursor, None);
            if let Some(prev) = previous {
                for edge in &prev.edges {
                    let now = snapshot.edge(&edge.source, &edge.target).unwrap();
                    assert!(now.weight >= edge.weight);
                }
            }
            previous = Some(snapshot);
        }
    }

    #[test]
    fn test_core_metrics_not_applicable() {
        let ctx = scenario();
        let snapshot = SnapshotEngine::default().materialize(&ctx, 20, None);

        let core = snapshot.node("1").unwrap();
        assert!(core.is_core);
        assert_eq!(core.color, CORE_COLOR);
        assert!(core.centrality.is_none());
        assert!(core.betweenness.is_none());
        assert_eq!(core.connected_core_nodes, 1);

        let other = snapshot.node("3").unwrap();
        assert!(!other.is_core);
        assert_eq!(other.centrality, Some(0.5));
        assert_eq!(other.betweenness, Some(0.0));
        assert_eq!(other.connected_core_nodes, 1);
    }

    #[test]
    fn test_node_size_scales_with_interactions() {
        let ctx = scenario();
        let snapshot = SnapshotEngine::default().materialize(&ctx, 20, None);

        // node 1 touches all three edges, node 3 one of them
        assert_eq!(snapshot.node("1").unwrap().size, 90.0);
        assert!((snapshot.node("3").unwrap().size - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_drives_color() {
        let mut graph = InteractionGraph::new();
        graph.add_edge(Edge::new("1", "3", 1, EdgeType::Liked));
        graph.add_edge(Edge::new("3", "2", 2, EdgeType::Liked));
        graph.add_edge(Edge::new("1", "4", 3, EdgeType::Liked));
        let ctx = GraphContext::new(graph, ids(&["1", "2"]));

        let snapshot = SnapshotEngine::default().materialize(&ctx, 3, None);
        assert_eq!(snapshot.node("3").unwrap().color, "rgb(255, 0, 255)");
        assert_eq!(snapshot.node("4").unwrap().color, "rgb(0, 0, 255)");
    }

    #[test]
    fn test_path_highlight_to_each_core() {
        let mut graph = InteractionGraph::new();
        graph.add_edge(Edge::new("1", "3", 1, EdgeType::Liked));
        graph.add_edge(Edge::new("3", "4", 2, EdgeType::Liked));
        graph.add_edge(Edge::new("2", "5", 3, EdgeType::Liked));
        let ctx = GraphContext::new(graph, ids(&["1", "2"]));

        let snapshot = SnapshotEngine::default().materialize(&ctx, 3, Some("4"));

        let highlighted: Vec<&str> = snapshot
            .nodes
            .iter()
            .filter(|n| n.on_path_to_core)
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(highlighted, vec!["1", "3", "4"]);

        assert!(snapshot.edge("1", "3").unwrap().on_path_to_core);
        assert!(snapshot.edge("3", "4").unwrap().on_path_to_core);
        assert!(!snapshot.edge("2", "5").unwrap().on_path_to_core);
        assert_eq!(snapshot.selected.as_deref(), Some("4"));
    }

    #[test]
    fn test_inactive_selection_highlights_nothing() {
        let ctx = scenario();
        let snapshot = SnapshotEngine::default().materialize(&ctx, 10, Some("99"));
        assert!(snapshot.nodes.iter().all(|n| !n.on_path_to_core));
        assert!(snapshot.edges.iter().all(|e| !e.on_path_to_core));
    }

    #[test]
    fn test_recency_highlight_grows_with_cursor() {
        let mut graph = InteractionGraph::new();
        graph.add_edge(Edge::new("1", "3", 0, EdgeType::Liked));
        graph.add_edge(Edge::new("1", "4", 1, EdgeType::Liked));
        graph.add_edge(Edge::new("1", "4", 2, EdgeType::Liked));
        graph.add_edge(Edge::new("1", "5", 90, EdgeType::Liked));
        let ctx = GraphContext::new(graph, ids(&["1"]));
        let engine = SnapshotEngine::default();

        // N = 1: only the strongest non-core node, 4
        let early = engine.materialize(&ctx, 2, None);
        assert!(early.edge("1", "4").unwrap().recency_highlight);
        assert!(!early.edge("1", "3").unwrap().recency_highlight);

        // N = 10 at the end of the range: everyone
        let late = engine.materialize(&ctx, 90, None);
        assert!(late.edges.iter().all(|e| e.recency_highlight));
    }

    #[test]
    fn test_empty_graph_is_core_only() {
        let ctx = GraphContext::new(InteractionGraph::new(), ids(&["1", "2"]));
        let snapshot = SnapshotEngine::default().materialize(&ctx, 0, None);

        assert!(snapshot.initial);
        assert_eq!(node_ids(&snapshot), vec!["1", "2"]);
        assert!(snapshot.edges.is_empty());
        assert!(snapshot.nodes.iter().all(|n| n.size == 45.0));
        assert_eq!(snapshot.node("1").unwrap().label, "1");
    }
}
