use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{NamedOrBlankNode, Quad, Term};
use std::collections::HashMap;
use tracing::{debug, info};

use super::{DEFAULT_KIND, GraphData, kind_from_iri};
use crate::error::{WorkbenchError, WorkbenchResult};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Builder that projects RDF triples onto a [`GraphData`].
pub struct GraphBuilder {
    graph: GraphData,
    /// Ontology type per subject (most recently seen `rdf:type` wins)
    node_types: HashMap<String, String>,
    triples_seen: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: GraphData::new(),
            node_types: HashMap::new(),
            triples_seen: 0,
        }
    }

    /// Parse a Turtle document into a fresh graph.
    ///
    /// Any parse error aborts the whole document; no partial graph escapes.
    pub fn from_turtle(turtle: &str) -> WorkbenchResult<GraphData> {
        let mut builder = Self::new();
        for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(turtle.as_bytes()) {
            let quad = quad.map_err(|e| WorkbenchError::Parse(e.to_string()))?;
            builder.add_quad(&quad);
        }
        Ok(builder.finish())
    }

    fn add_quad(&mut self, quad: &Quad) {
        let subject = match &quad.subject {
            NamedOrBlankNode::NamedNode(node) => node.as_str().to_string(),
            NamedOrBlankNode::BlankNode(node) => format!("_:{}", node.as_str()),
        };
        let object = match &quad.object {
            Term::NamedNode(node) => Some(node.as_str()),
            _ => None,
        };
        self.add_triple(&subject, quad.predicate.as_str(), object);
    }

    /// Add one triple. `object` is `Some` only for IRI objects; literals and
    /// blank nodes are passed as `None` and never produce nodes or edges.
    pub fn add_triple(&mut self, subject: &str, predicate: &str, object: Option<&str>) {
        self.triples_seen += 1;

        if predicate == RDF_TYPE
            && let Some(type_iri) = object
        {
            self.node_types
                .insert(subject.to_string(), kind_from_iri(type_iri));
        }

        let subject_kind = self.kind_of(subject);
        let source = self.graph.ensure_node(subject, &subject_kind);

        if let Some(object) = object.filter(|o| is_uri(o)) {
            let object_kind = self.kind_of(object);
            let target = self.graph.ensure_node(object, &object_kind);
            self.graph.add_edge(source, target, predicate);
        }
    }

    fn kind_of(&self, id: &str) -> String {
        self.node_types
            .get(id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_KIND.to_string())
    }

    /// Reconcile node types with every `rdf:type` seen and return the graph.
    pub fn finish(mut self) -> GraphData {
        for node in self.graph.nodes_mut() {
            node.kind = self
                .node_types
                .get(&node.id)
                .cloned()
                .unwrap_or_else(|| DEFAULT_KIND.to_string());
        }
        debug!(triples = self.triples_seen, "parsing complete");
        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "graph built"
        );
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Objects count as resources only when they are http(s) IRIs.
fn is_uri(value: &str) -> bool {
    value.starts_with("http")
}
