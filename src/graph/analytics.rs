use petgraph::Direction;
use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

use super::GraphData;

/// Graph analytics results
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub density: f64,
    pub avg_degree: f64,
    pub max_degree: usize,
    /// Node count per ontology type, largest first
    pub type_counts: Vec<(String, usize)>,
    /// Predicate usage, largest first
    pub predicate_counts: Vec<(String, usize)>,
    pub top_degree: Vec<(String, usize)>,
}

/// Compute degree (in + out) for each node.
pub fn node_degrees(graph: &GraphData) -> HashMap<NodeIndex, usize> {
    let g = graph.petgraph();
    g.node_indices()
        .map(|ni| {
            let in_deg = g.edges_directed(ni, Direction::Incoming).count();
            let out_deg = g.edges_directed(ni, Direction::Outgoing).count();
            (ni, in_deg + out_deg)
        })
        .collect()
}

fn sorted_counts(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Compute full graph statistics.
pub fn compute_stats(graph: &GraphData) -> GraphStats {
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();

    let connected = connected_components(graph.petgraph());

    let density = if node_count > 1 {
        edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    } else {
        0.0
    };

    let degrees = node_degrees(graph);
    let avg_degree = if node_count > 0 {
        degrees.values().sum::<usize>() as f64 / node_count as f64
    } else {
        0.0
    };
    let max_degree = degrees.values().copied().max().unwrap_or(0);

    let mut degree_vec: Vec<(String, usize)> = degrees
        .iter()
        .map(|(&ni, &d)| (graph.node_at(ni).id.clone(), d))
        .collect();
    degree_vec.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    degree_vec.truncate(10);

    let mut type_counts: HashMap<String, usize> = HashMap::new();
    for node in graph.nodes() {
        *type_counts.entry(node.kind.clone()).or_default() += 1;
    }

    let mut predicate_counts: HashMap<String, usize> = HashMap::new();
    for edge in graph.edges() {
        *predicate_counts.entry(edge.label.to_string()).or_default() += 1;
    }

    GraphStats {
        node_count,
        edge_count,
        connected_components: connected,
        density,
        avg_degree,
        max_degree,
        type_counts: sorted_counts(type_counts),
        predicate_counts: sorted_counts(predicate_counts),
        top_degree: degree_vec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn build_simple_graph() -> GraphData {
        let mut b = GraphBuilder::new();
        b.add_triple("http://x/a", "http://x/p", Some("http://x/b"));
        b.add_triple("http://x/b", "http://x/p", Some("http://x/c"));
        b.add_triple("http://x/a", "http://x/q", Some("http://x/c"));
        b.add_triple(
            "http://x/a",
            crate::graph::builder::RDF_TYPE,
            Some("urn:Service"),
        );
        b.finish()
    }

    #[test]
    fn test_node_degrees() {
        let g = build_simple_graph();
        let deg = node_degrees(&g);
        let a_idx = g.index_of("http://x/a").unwrap();
        let c_idx = g.index_of("http://x/c").unwrap();
        assert_eq!(deg[&a_idx], 2);
        assert_eq!(deg[&c_idx], 2);
    }

    #[test]
    fn test_compute_stats() {
        let g = build_simple_graph();
        let stats = compute_stats(&g);
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.connected_components, 1);
        assert!(stats.density > 0.0);
        assert!(stats.avg_degree > 0.0);
        assert_eq!(stats.max_degree, 2);
        assert_eq!(stats.type_counts[0], ("default".to_string(), 2));
        assert_eq!(stats.predicate_counts[0], ("http://x/p".to_string(), 2));
    }

    #[test]
    fn test_compute_stats_disconnected() {
        let mut b = GraphBuilder::new();
        b.add_triple("http://x/a", "http://x/p", Some("http://x/b"));
        b.add_triple("http://x/c", "http://x/p", Some("http://x/d"));
        let stats = compute_stats(&b.finish());
        assert_eq!(stats.connected_components, 2);
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&GraphData::new());
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.avg_degree, 0.0);
        assert!(stats.top_degree.is_empty());
    }
}
