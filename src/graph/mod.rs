pub mod analytics;
pub mod builder;
pub mod filter;
pub mod source;

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

/// Type assigned to nodes without an `rdf:type` triple.
pub const DEFAULT_KIND: &str = "default";

/// A resource in the graph, identified by its URI (or blank-node label).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    pub vx: f64,
    #[serde(skip)]
    pub vy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fy: Option<f64>,
    /// False until a layout or simulation has assigned a position.
    #[serde(skip)]
    pub placed: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            placed: false,
        }
    }

    /// Seed the node at a fixed coordinate, discarding any velocity.
    pub fn place(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.placed = true;
    }

    pub fn pin(&mut self, x: f64, y: f64) {
        self.fx = Some(x);
        self.fy = Some(y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    /// Short human-readable name: the last `/` segment of the id.
    pub fn display_name(&self) -> &str {
        display_name(&self.id)
    }
}

/// A triple projected onto the graph; the predicate URI is kept as the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub label: String,
}

/// Borrowed view of an edge with its endpoints resolved to node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeView<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub label: &'a str,
}

/// Node/edge collections keyed by URI.
///
/// Node indices follow insertion order and edge indices follow triple
/// discovery order; layouts rely on both.
#[derive(Debug, Clone, Default)]
pub struct GraphData {
    graph: DiGraph<Node, Edge>,
    index: HashMap<String, NodeIndex>,
}

impl GraphData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node for `id`, creating it with `kind` if it does not exist yet.
    pub fn ensure_node(&mut self, id: &str, kind: &str) -> NodeIndex {
        if let Some(&index) = self.index.get(id) {
            index
        } else {
            let index = self.graph.add_node(Node::new(id, kind));
            self.index.insert(id.to_string(), index);
            index
        }
    }

    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, label: &str) -> EdgeIndex {
        self.graph.add_edge(
            source,
            target,
            Edge {
                label: label.to_string(),
            },
        )
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|i| &self.graph[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = self.index_of(id)?;
        self.graph.node_weight_mut(index)
    }

    pub fn node_at(&self, index: NodeIndex) -> &Node {
        &self.graph[index]
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.graph.node_weights_mut()
    }

    /// Edges in discovery order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.graph.edge_references().map(|e| EdgeView {
            source: &self.graph[e.source()].id,
            target: &self.graph[e.target()].id,
            label: &e.weight().label,
        })
    }

    /// Edge endpoints as dense indices, in discovery order.
    pub fn edge_endpoints(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect()
    }

    /// `(source, target, label)` owned triples, in discovery order.
    pub fn edge_triples(&self) -> Vec<(String, String, String)> {
        self.edges()
            .map(|e| (e.source.to_string(), e.target.to_string(), e.label.to_string()))
            .collect()
    }

    /// Split the edges touching `id` into `(inbound, outbound)`.
    ///
    /// A self-loop is reported once, as outbound.
    pub fn relations_of(&self, id: &str) -> (Vec<EdgeView<'_>>, Vec<EdgeView<'_>>) {
        let mut inbound = Vec::new();
        let mut outbound = Vec::new();
        for edge in self.edges() {
            if edge.source == id {
                outbound.push(edge);
            } else if edge.target == id {
                inbound.push(edge);
            }
        }
        (inbound, outbound)
    }

    pub fn in_degree(&self, index: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .filter(|&n| n != index)
            .count()
    }

    pub fn out_degree(&self, index: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(index, Direction::Outgoing)
            .filter(|&n| n != index)
            .count()
    }

    /// Direct successors of `index`, in edge discovery order.
    pub fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        out.sort_by_key(|(edge, _)| *edge);
        out.into_iter().map(|(_, target)| target).collect()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.index.clear();
    }

    /// Distinct node types in order of first appearance.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for node in self.nodes() {
            if !kinds.contains(&node.kind.as_str()) {
                kinds.push(&node.kind);
            }
        }
        kinds
    }

    pub(crate) fn petgraph(&self) -> &DiGraph<Node, Edge> {
        &self.graph
    }
}

/// Last non-empty `/` segment, then the last non-empty `#` segment of it.
///
/// Returns `None` when the IRI has no usable tail.
pub fn last_segment(iri: &str) -> Option<&str> {
    let tail = iri.rsplit('/').find(|s| !s.is_empty())?;
    tail.rsplit('#').find(|s| !s.is_empty())
}

/// Ontology type name derived from an `rdf:type` object.
pub fn kind_from_iri(iri: &str) -> String {
    last_segment(iri).unwrap_or(DEFAULT_KIND).to_string()
}

/// Predicate label for detail views.
pub fn predicate_label(predicate: &str) -> &str {
    last_segment(predicate).unwrap_or("connected to")
}

pub fn display_name(id: &str) -> &str {
    match id.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => id,
    }
}
