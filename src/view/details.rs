use serde::Serialize;
use std::fmt::Write as _;

use super::scene::escape_xml;
use crate::error::{WorkbenchError, WorkbenchResult};
use crate::graph::{GraphData, display_name, predicate_label};

pub const NO_SELECTION_HTML: &str =
    r#"<div class="no-selection">Click on a node to view its details</div>"#;

/// One row of the relations list; `node_id` is what navigation selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub predicate: String,
    pub node_id: String,
    pub node_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetails {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub outbound: Vec<Relation>,
    pub inbound: Vec<Relation>,
}

impl NodeDetails {
    pub fn for_node(graph: &GraphData, id: &str) -> WorkbenchResult<Self> {
        let node = graph
            .node(id)
            .ok_or_else(|| WorkbenchError::UnknownNode(id.to_string()))?;
        let (inbound, outbound) = graph.relations_of(id);
        let relation = |predicate: &str, other: &str| Relation {
            predicate: predicate_label(predicate).to_string(),
            node_id: other.to_string(),
            node_name: display_name(other).to_string(),
        };

        Ok(Self {
            id: node.id.clone(),
            name: display_name(&node.id).to_string(),
            kind: node.kind.clone(),
            outbound: outbound.iter().map(|e| relation(e.label, e.target)).collect(),
            inbound: inbound.iter().map(|e| relation(e.label, e.source)).collect(),
        })
    }

    pub fn has_relations(&self) -> bool {
        !self.outbound.is_empty() || !self.inbound.is_empty()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.name);
        let _ = writeln!(out, "  Type: {}", self.kind);
        let _ = writeln!(out, "  URI:  {}", self.id);
        if !self.outbound.is_empty() {
            let _ = writeln!(out, "\nOutbound Relations");
            for rel in &self.outbound {
                let _ = writeln!(out, "  {} → {}", rel.predicate, rel.node_name);
            }
        }
        if !self.inbound.is_empty() {
            let _ = writeln!(out, "\nInbound Relations");
            for rel in &self.inbound {
                let _ = writeln!(out, "  {} ← {}", rel.predicate, rel.node_name);
            }
        }
        if !self.has_relations() {
            let _ = writeln!(out, "\nNo relations found");
        }
        out
    }

    /// Fragment for the details panel. Relation rows carry `data-target-id`
    /// so a click can navigate to the related node.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            concat!(
                "<h3>{}</h3>",
                r#"<div class="property-item"><span class="property-label">Type:</span><span class="property-value">{}</span></div>"#,
                r#"<div class="property-item"><span class="property-label">URI:</span><span class="property-value uri">{}</span></div>"#
            ),
            escape_xml(&self.name),
            escape_xml(&self.kind),
            escape_xml(&self.id)
        );

        if !self.outbound.is_empty() {
            html.push_str(r#"<h4>Outbound Relations</h4><div class="property-list">"#);
            for rel in &self.outbound {
                let _ = write!(
                    html,
                    r#"<div class="relation-item" data-target-id="{}"><span class="relation-predicate">{}</span><span class="relation-target">→ {}</span></div>"#,
                    escape_xml(&rel.node_id),
                    escape_xml(&rel.predicate),
                    escape_xml(&rel.node_name)
                );
            }
            html.push_str("</div>");
        }
        if !self.inbound.is_empty() {
            html.push_str(r#"<h4>Inbound Relations</h4><div class="property-list">"#);
            for rel in &self.inbound {
                let _ = write!(
                    html,
                    r#"<div class="relation-item" data-target-id="{}"><span class="relation-predicate">{}</span><span class="relation-target">{} →</span></div>"#,
                    escape_xml(&rel.node_id),
                    escape_xml(&rel.predicate),
                    escape_xml(&rel.node_name)
                );
            }
            html.push_str("</div>");
        }
        if !self.has_relations() {
            html.push_str(
                r#"<h4>Relations</h4><div class="no-selection">No relations found</div>"#,
            );
        }
        html
    }
}
