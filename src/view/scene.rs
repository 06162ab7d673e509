//! Visual model of the graph and its SVG serialization.

use serde::Serialize;
use std::fmt::Write as _;

use super::panels::{INSTRUCTIONS, PanelState, legend_entries};
use super::zoom::ZoomTransform;
use crate::graph::{GraphData, display_name};
use crate::layout::{LayoutKind, Viewport};

/// Fill colour per ontology type; `default` is the fallback.
pub const COLOR_SCHEME: &[(&str, &str)] = &[
    ("Application", "#ff6b6b"),
    ("Service", "#4ecdc4"),
    ("Container", "#45b7d1"),
    ("Database", "#96ceb4"),
    ("DatabaseSchema", "#a8e6cf"),
    ("VirtualServer", "#feca57"),
    ("PhysicalServer", "#ff9ff3"),
    ("ServerHardware", "#54a0ff"),
    ("DataCenter", "#5f27cd"),
    ("IPAddress", "#00d2d3"),
    ("NetworkSegment", "#ff6348"),
    ("NetworkCard", "#dda0dd"),
    ("Disk", "#c44569"),
    ("DigitalCertificate", "#40407a"),
    ("DNSDomain", "#706fd3"),
    ("ResourceGroup", "#f8b500"),
    ("Department", "#2c2c54"),
    ("Scope", "#1dd1a1"),
    ("MonitoringAgent", "#ff5722"),
    ("LogAggregator", "#ff9800"),
    ("Deployment", "#795548"),
    ("Workflow", "#607d8b"),
    ("WorkflowStep", "#9e9e9e"),
    ("Environment", "#4caf50"),
    ("User", "#e91e63"),
    ("Team", "#9c27b0"),
    ("Event", "#ff5252"),
    ("Incident", "#f44336"),
    ("LoadBalancer", "#3f51b5"),
    ("Firewall", "#009688"),
    ("FirewallRule", "#00bcd4"),
    ("Backup", "#8bc34a"),
    ("Storage", "#cddc39"),
    ("default", "#69b3a2"),
];

const DEFAULT_COLOR: &str = "#69b3a2";
pub const LABEL_DX: f64 = 12.0;
pub const LABEL_DY: f64 = 4.0;
const LABEL_MAX: usize = 15;
const LABEL_KEEP: usize = 12;

pub fn node_color(kind: &str) -> &'static str {
    COLOR_SCHEME
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, c)| *c)
        .unwrap_or(DEFAULT_COLOR)
}

pub fn node_radius(kind: &str) -> f64 {
    match kind {
        "DataCenter" | "Environment" => 12.0,
        "PhysicalServer" | "VirtualServer" => 10.0,
        "Application" | "Service" | "Database" => 9.0,
        _ => 8.0,
    }
}

/// Names longer than 15 characters are cut to 12 plus an ellipsis.
pub fn truncate_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX {
        let kept: String = name.chars().take(LABEL_KEEP).collect();
        format!("{kept}...")
    } else {
        name.to_string()
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStyle {
    Normal,
    Selected,
    Dragging,
}

impl NodeStyle {
    pub fn stroke(&self) -> &'static str {
        match self {
            NodeStyle::Normal => "#333",
            NodeStyle::Selected => "#007bff",
            NodeStyle::Dragging => "#ff6b6b",
        }
    }

    pub fn stroke_width(&self) -> u32 {
        match self {
            NodeStyle::Normal => 2,
            NodeStyle::Selected => 4,
            NodeStyle::Dragging => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeVisual {
    pub id: String,
    pub kind: String,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: &'static str,
    pub style: NodeStyle,
    pub title: String,
    pub label: String,
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeVisual {
    pub source: usize,
    pub target: usize,
    pub label: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Everything drawn on the surface, rebuilt from scratch on full renders
/// and position-updated on redraws.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub viewport: Viewport,
    pub layout: LayoutKind,
    #[serde(skip)]
    pub transform: ZoomTransform,
    pub nodes: Vec<NodeVisual>,
    pub edges: Vec<EdgeVisual>,
    pub filter_note: Option<String>,
}

impl Scene {
    pub fn build(graph: &GraphData, viewport: Viewport, layout: LayoutKind) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| {
                let name = display_name(&node.id);
                NodeVisual {
                    id: node.id.clone(),
                    kind: node.kind.clone(),
                    cx: node.x,
                    cy: node.y,
                    radius: node_radius(&node.kind),
                    fill: node_color(&node.kind),
                    style: NodeStyle::Normal,
                    title: format!("{} ({})", name, node.kind),
                    label: truncate_label(name),
                    label_x: node.x + LABEL_DX,
                    label_y: node.y + LABEL_DY,
                }
            })
            .collect();
        let labels: Vec<String> = graph.edges().map(|e| e.label.to_string()).collect();
        let edges = graph
            .edge_endpoints()
            .into_iter()
            .zip(labels)
            .map(|((source, target), label)| EdgeVisual {
                source,
                target,
                label,
                x1: 0.0,
                y1: 0.0,
                x2: 0.0,
                y2: 0.0,
            })
            .collect();

        let mut scene = Self {
            viewport,
            layout,
            transform: ZoomTransform::IDENTITY,
            nodes,
            edges,
            filter_note: None,
        };
        scene.update_edges();
        scene
    }

    /// Redraw: copy current node positions into the visuals.
    pub fn update_positions(&mut self, graph: &GraphData) {
        for (visual, node) in self.nodes.iter_mut().zip(graph.nodes()) {
            visual.cx = node.x;
            visual.cy = node.y;
            visual.label_x = node.x + LABEL_DX;
            visual.label_y = node.y + LABEL_DY;
        }
        self.update_edges();
    }

    fn update_edges(&mut self) {
        for edge in &mut self.edges {
            let (s, t) = (&self.nodes[edge.source], &self.nodes[edge.target]);
            edge.x1 = s.cx;
            edge.y1 = s.cy;
            edge.x2 = t.cx;
            edge.y2 = t.cy;
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeVisual> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn set_style(&mut self, id: &str, style: NodeStyle) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.style = style;
                true
            }
            None => false,
        }
    }

    pub fn count_style(&self, style: NodeStyle) -> usize {
        self.nodes.iter().filter(|n| n.style == style).count()
    }

    pub fn to_svg(&self, panels: &PanelState) -> String {
        let Viewport { width, height } = self.viewport;
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = writeln!(
            svg,
            r##"  <rect class="background" width="{width}" height="{height}" fill="#fafafa"/>"##
        );
        let _ = writeln!(
            svg,
            r#"  <g class="graph-container" transform="{}">"#,
            self.transform
        );

        for edge in &self.edges {
            let _ = writeln!(
                svg,
                r##"    <line class="link" data-source="{}" data-target="{}" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="#999" stroke-opacity="0.6" stroke-width="1.5"><title>{}</title></line>"##,
                edge.source,
                edge.target,
                edge.x1,
                edge.y1,
                edge.x2,
                edge.y2,
                escape_xml(&edge.label)
            );
        }
        for node in &self.nodes {
            let class = match node.style {
                NodeStyle::Normal => "node",
                NodeStyle::Selected => "node selected",
                NodeStyle::Dragging => "node dragging",
            };
            let _ = writeln!(
                svg,
                r#"    <circle class="{class}" data-id="{}" cx="{:.2}" cy="{:.2}" r="{}" fill="{}" stroke="{}" stroke-width="{}px"><title>{}</title></circle>"#,
                escape_xml(&node.id),
                node.cx,
                node.cy,
                node.radius,
                node.fill,
                node.style.stroke(),
                node.style.stroke_width(),
                escape_xml(&node.title)
            );
        }
        for node in &self.nodes {
            let _ = writeln!(
                svg,
                r##"    <text class="node-label" x="{:.2}" y="{:.2}" font-size="9px" fill="#333">{}</text>"##,
                node.label_x,
                node.label_y,
                escape_xml(&node.label)
            );
        }
        svg.push_str("  </g>\n");

        svg.push_str(&reset_button());
        if panels.legend_visible {
            svg.push_str(&legend_group());
        }
        if panels.instructions_visible {
            svg.push_str(&instructions_group(panels.legend_visible));
        }
        let _ = writeln!(
            svg,
            r##"  <text class="layout-name" x="{}" y="24" text-anchor="end" font-size="12px" font-weight="bold" fill="#333">Layout: {}</text>"##,
            width - 20.0,
            self.layout.display_name()
        );
        if let Some(note) = &self.filter_note {
            let _ = writeln!(
                svg,
                r##"  <text class="filter-banner" x="{}" y="{}" text-anchor="middle" font-size="12px" fill="#b35c00">{}</text>"##,
                width / 2.0,
                height - 16.0,
                escape_xml(note)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn reset_button() -> String {
    concat!(
        r#"  <g class="reset-button" transform="translate(20, 60)">"#,
        r##"<rect width="80" height="25" rx="3" fill="rgba(255, 255, 255, 0.9)" stroke="#333" stroke-width="1px"/>"##,
        r##"<text x="40" y="17" text-anchor="middle" font-size="11px" fill="#333">Reset Zoom</text></g>"##,
        "\n"
    )
    .to_string()
}

const LEGEND_TOP: f64 = 120.0;
const LEGEND_ROW: f64 = 18.0;
const INSTRUCTION_ROW: f64 = 16.0;

fn legend_group() -> String {
    let entries = legend_entries();
    let mut out = String::new();
    let _ = writeln!(out, r#"  <g class="legend" transform="translate(20, {LEGEND_TOP})">"#);
    let _ = writeln!(
        out,
        r##"    <rect x="-5" y="-11" width="170" height="{}" rx="3" fill="rgba(255, 255, 255, 0.9)" stroke="#ccc"/>"##,
        entries.len() as f64 * LEGEND_ROW + 10.0
    );
    for (i, (kind, color)) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            r##"    <g class="legend-item" transform="translate(0, {})"><circle r="6" cx="8" cy="0" fill="{color}" stroke="#333"/><text x="20" y="0" dy="0.35em" font-size="11px" fill="#333">{kind}</text></g>"##,
            i as f64 * LEGEND_ROW
        );
    }
    out.push_str("  </g>\n");
    out
}

fn instructions_group(below_legend: bool) -> String {
    let top = if below_legend {
        LEGEND_TOP + legend_entries().len() as f64 * LEGEND_ROW + 20.0
    } else {
        LEGEND_TOP
    };
    let mut out = String::new();
    let _ = writeln!(out, r#"  <g class="instructions" transform="translate(20, {top})">"#);
    for (i, line) in INSTRUCTIONS.iter().enumerate() {
        let _ = writeln!(
            out,
            r##"    <text class="instruction-item" x="0" y="{}" dy="0.35em" font-size="10px" fill="#666">{}</text>"##,
            i as f64 * INSTRUCTION_ROW,
            escape_xml(line)
        );
    }
    out.push_str("  </g>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::{GraphBuilder, RDF_TYPE};

    fn graph() -> GraphData {
        let mut b = GraphBuilder::new();
        b.add_triple("http://x/web-01", RDF_TYPE, Some("urn:x/VirtualServer"));
        b.add_triple(
            "http://x/a-very-long-application-name",
            "http://x/deployedOn",
            Some("http://x/web-01"),
        );
        let mut g = b.finish();
        for (i, node) in g.nodes_mut().enumerate() {
            node.place(i as f64 * 100.0, 50.0);
        }
        g
    }

    #[test]
    fn test_radius_and_color_by_kind() {
        assert_eq!(node_radius("DataCenter"), 12.0);
        assert_eq!(node_radius("VirtualServer"), 10.0);
        assert_eq!(node_radius("Database"), 9.0);
        assert_eq!(node_radius("Disk"), 8.0);
        assert_eq!(node_color("Service"), "#4ecdc4");
        assert_eq!(node_color("Unknown"), "#69b3a2");
    }

    #[test]
    fn test_label_truncation() {
        assert_eq!(truncate_label("web-01"), "web-01");
        assert_eq!(truncate_label("exactly15chars!"), "exactly15chars!");
        assert_eq!(truncate_label("a-very-long-application-name"), "a-very-long-...");
    }

    #[test]
    fn test_build_scene() {
        let scene = Scene::build(&graph(), Viewport::default(), LayoutKind::Grid);
        let web = scene.node("http://x/web-01").unwrap();
        assert_eq!(web.radius, 10.0);
        assert_eq!(web.fill, "#feca57");
        assert_eq!(web.title, "web-01 (VirtualServer)");
        assert_eq!((web.label_x, web.label_y), (12.0, 54.0));
        assert_eq!(scene.edges.len(), 1);
        assert_eq!(
            (scene.edges[0].x1, scene.edges[0].x2),
            (100.0, 0.0)
        );
    }

    #[test]
    fn test_update_positions_moves_edges_and_labels() {
        let mut g = graph();
        let mut scene = Scene::build(&g, Viewport::default(), LayoutKind::Grid);
        g.node_mut("http://x/web-01").unwrap().place(300.0, 300.0);
        scene.update_positions(&g);
        let web = scene.node("http://x/web-01").unwrap();
        assert_eq!((web.cx, web.cy), (300.0, 300.0));
        assert_eq!((web.label_x, web.label_y), (312.0, 304.0));
        assert_eq!((scene.edges[0].x2, scene.edges[0].y2), (300.0, 300.0));
    }

    #[test]
    fn test_svg_output() {
        let mut scene = Scene::build(&graph(), Viewport::default(), LayoutKind::Tree);
        scene.set_style("http://x/web-01", NodeStyle::Selected);
        scene.filter_note = Some("Filtered: <subset>".into());
        let svg = scene.to_svg(&PanelState::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"class="node selected""#));
        assert!(svg.contains(r##"stroke="#007bff" stroke-width="4px""##));
        assert!(svg.contains("Layout: Tree"));
        assert!(svg.contains(r#"class="legend""#));
        assert!(svg.contains("Filtered: &lt;subset&gt;"));
        assert!(svg.contains("translate(0,0) scale(1)"));
        assert!(svg.contains(r#"class="link" data-source="1" data-target="0""#));
    }

    #[test]
    fn test_hidden_overlays_not_drawn() {
        let scene = Scene::build(&graph(), Viewport::default(), LayoutKind::Tree);
        let mut panels = PanelState::default();
        panels.legend_visible = false;
        panels.instructions_visible = false;
        let svg = scene.to_svg(&panels);
        assert!(!svg.contains(r#"class="legend""#));
        assert!(!svg.contains(r#"class="instructions""#));
    }
}
