use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::graph::{GraphData, display_name, predicate_label};
use crate::layout::LayoutKind;

#[derive(Serialize)]
struct JsonNode<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct JsonEdge<'a> {
    source: &'a str,
    target: &'a str,
    label: &'a str,
}

/// Export format for JSON
#[derive(Serialize)]
struct JsonExport<'a> {
    layout: &'a str,
    nodes: Vec<JsonNode<'a>>,
    edges: Vec<JsonEdge<'a>>,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Export the laid-out graph to a JSON file
pub fn export_json(graph: &GraphData, layout: LayoutKind, path: &Path) -> Result<()> {
    let export = JsonExport {
        layout: layout.as_str(),
        nodes: graph
            .nodes()
            .map(|n| JsonNode {
                id: &n.id,
                name: n.display_name(),
                kind: &n.kind,
                x: n.x,
                y: n.y,
            })
            .collect(),
        edges: graph
            .edges()
            .map(|e| JsonEdge {
                source: e.source,
                target: e.target,
                label: e.label,
            })
            .collect(),
    };

    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, &export).context("Failed to write JSON")?;
    writer.flush()?;

    Ok(())
}

/// Export nodes and edges to CSV files
pub fn export_csv(graph: &GraphData, nodes_path: &Path, edges_path: &Path) -> Result<()> {
    let mut writer = create(nodes_path)?;
    writeln!(writer, "id,name,type,x,y")?;
    for node in graph.nodes() {
        writeln!(
            writer,
            "\"{}\",\"{}\",\"{}\",{:.2},{:.2}",
            escape_csv(&node.id),
            escape_csv(node.display_name()),
            escape_csv(&node.kind),
            node.x,
            node.y
        )?;
    }
    writer.flush()?;

    let mut writer = create(edges_path)?;
    writeln!(writer, "source,target,predicate,label")?;
    for edge in graph.edges() {
        writeln!(
            writer,
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            escape_csv(edge.source),
            escape_csv(edge.target),
            escape_csv(edge.label),
            escape_csv(predicate_label(edge.label))
        )?;
    }
    writer.flush()?;

    Ok(())
}

/// Export to GraphML format, keeping layout positions as node data
pub fn export_graphml(graph: &GraphData, path: &Path) -> Result<()> {
    let mut writer = create(path)?;

    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        writer,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;

    writeln!(
        writer,
        r#"  <key id="name" for="node" attr.name="name" attr.type="string"/>"#
    )?;
    writeln!(
        writer,
        r#"  <key id="type" for="node" attr.name="type" attr.type="string"/>"#
    )?;
    writeln!(
        writer,
        r#"  <key id="x" for="node" attr.name="x" attr.type="double"/>"#
    )?;
    writeln!(
        writer,
        r#"  <key id="y" for="node" attr.name="y" attr.type="double"/>"#
    )?;
    writeln!(
        writer,
        r#"  <key id="predicate" for="edge" attr.name="predicate" attr.type="string"/>"#
    )?;

    writeln!(writer, r#"  <graph id="G" edgedefault="directed">"#)?;

    for node in graph.nodes() {
        writeln!(writer, r#"    <node id="{}">"#, escape_xml(&node.id))?;
        writeln!(
            writer,
            r#"      <data key="name">{}</data>"#,
            escape_xml(display_name(&node.id))
        )?;
        writeln!(writer, r#"      <data key="type">{}</data>"#, escape_xml(&node.kind))?;
        writeln!(writer, r#"      <data key="x">{:.2}</data>"#, node.x)?;
        writeln!(writer, r#"      <data key="y">{:.2}</data>"#, node.y)?;
        writeln!(writer, r#"    </node>"#)?;
    }

    for (i, edge) in graph.edges().enumerate() {
        writeln!(
            writer,
            r#"    <edge id="e{}" source="{}" target="{}">"#,
            i,
            escape_xml(edge.source),
            escape_xml(edge.target)
        )?;
        writeln!(
            writer,
            r#"      <data key="predicate">{}</data>"#,
            escape_xml(edge.label)
        )?;
        writeln!(writer, r#"    </edge>"#)?;
    }

    writeln!(writer, r#"  </graph>"#)?;
    writeln!(writer, r#"</graphml>"#)?;
    writer.flush()?;

    Ok(())
}

/// Write an already rendered document (SVG or HTML)
pub fn export_document(contents: &str, path: &Path) -> Result<()> {
    let mut writer = create(path)?;
    writer.write_all(contents.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Escape special characters for CSV
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

/// Escape special characters for XML
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::{GraphBuilder, RDF_TYPE};
    use std::fs;
    use tempfile::tempdir;

    fn sample_graph() -> GraphData {
        let mut b = GraphBuilder::new();
        b.add_triple(
            "https://example.org/devops/web01",
            RDF_TYPE,
            Some("https://w3id.org/devops-infra/PhysicalServer"),
        );
        b.add_triple(
            "https://example.org/devops/app",
            "https://w3id.org/devops-infra/deployedOn",
            Some("https://example.org/devops/web01"),
        );
        b.add_triple(
            "https://example.org/devops/a\"b<c>",
            "https://w3id.org/devops-infra/dependsOn",
            Some("https://example.org/devops/app"),
        );
        let mut g = b.finish();
        for (i, node) in g.nodes_mut().enumerate() {
            node.place(10.0 * i as f64, 5.0);
        }
        g
    }

    #[test]
    fn test_export_json_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        export_json(&sample_graph(), LayoutKind::Grid, &path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["layout"], "grid");
        assert_eq!(parsed["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(parsed["nodes"][0]["type"], "PhysicalServer");
        assert_eq!(parsed["nodes"][0]["name"], "web01");
        assert_eq!(parsed["nodes"][1]["x"], 10.0);
        assert_eq!(parsed["edges"][0]["label"], RDF_TYPE);
        assert_eq!(parsed["edges"][1]["label"], "https://w3id.org/devops-infra/deployedOn");
    }

    #[test]
    fn test_export_json_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        export_json(&GraphData::new(), LayoutKind::ForceDirected, &path).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed["nodes"].as_array().unwrap().is_empty());
        assert!(parsed["edges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_export_csv_header_and_rows() {
        let dir = tempdir().unwrap();
        let nodes_path = dir.path().join("g.nodes.csv");
        let edges_path = dir.path().join("g.edges.csv");
        export_csv(&sample_graph(), &nodes_path, &edges_path).unwrap();

        let nodes = fs::read_to_string(&nodes_path).unwrap();
        let mut lines = nodes.lines();
        assert_eq!(lines.next().unwrap(), "id,name,type,x,y");
        assert_eq!(
            lines.next().unwrap(),
            "\"https://example.org/devops/web01\",\"web01\",\"PhysicalServer\",0.00,5.00"
        );
        assert!(nodes.contains("a\"\"b<c>"));

        let edges = fs::read_to_string(&edges_path).unwrap();
        assert!(edges.starts_with("source,target,predicate,label\n"));
        assert!(edges.contains(",\"deployedOn\""));
        assert_eq!(edges.lines().count(), 4);
    }

    #[test]
    fn test_export_graphml_escaping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("g.graphml");
        export_graphml(&sample_graph(), &path).unwrap();

        let xml = fs::read_to_string(&path).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"edgedefault="directed""#));
        assert!(xml.contains("a&quot;b&lt;c&gt;"));
        assert!(!xml.contains("a\"b<c>"));
        assert_eq!(xml.matches("<edge ").count(), 3);
        assert!(xml.contains(r#"<data key="type">PhysicalServer</data>"#));
    }

    #[test]
    fn test_export_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("g.svg");
        export_document("<svg/>", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<svg/>");
    }

    #[test]
    fn test_escape_helpers() {
        assert_eq!(escape_csv(r#"say "hi""#), r#"say ""hi"""#);
        assert_eq!(
            escape_xml(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;"
        );
    }
}
