//! End-to-end CLI tests using `assert_cmd`.
//!
//! These tests invoke the compiled binary against Turtle files in a
//! temporary directory. They need no SPARQL server and no network
//! (except tests marked #[ignore]).

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const SAMPLE: &str = r#"
@prefix devops: <https://w3id.org/devops-infra/> .
@prefix ex: <https://example.org/devops/> .
@prefix dct: <http://purl.org/dc/terms/> .

ex:web01 a devops:PhysicalServer ; dct:identifier "web01" .
ex:vm1 a devops:VirtualServer ; dct:identifier "vm1" ; devops:hostedOn ex:web01 .
ex:shop a devops:Application ; dct:identifier "shop" ; devops:hasVersion "1.2" ;
    devops:deployedOn ex:vm1 ; devops:dependsOn ex:db .
ex:db a devops:Database ; dct:identifier "db" ; devops:deployedOn ex:vm1 .
"#;

/// Command with its config directory redirected into `home`.
fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ontobench").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let data = dir.path().join("infra.ttl");
    fs::write(&data, SAMPLE).unwrap();
    (dir, data)
}

// ─── Help / version ─────────────────────────────────────────────────────

#[test]
fn test_help_shows_commands() {
    let (dir, _) = workspace();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("layout"))
        .stdout(predicate::str::contains("details"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("viz"))
        .stdout(predicate::str::contains("session"));
}

#[test]
fn test_version_shows_name() {
    let (dir, _) = workspace();
    cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ontobench"));
}

// ─── Argument validation ────────────────────────────────────────────────

#[test]
fn test_layout_rejects_unknown_kind() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["layout", data.to_str().unwrap(), "--kind", "spiral"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_export_requires_output() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["export", data.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_export_rejects_invalid_format() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["export", data.to_str().unwrap(), "-o", "x", "--format", "cypher"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_query_data_conflicts_with_endpoint() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args([
            "query",
            "--data",
            data.to_str().unwrap(),
            "--endpoint",
            "http://localhost:1/sparql",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ─── Init ───────────────────────────────────────────────────────────────

#[test]
#[cfg(target_os = "linux")]
fn test_init_writes_config_and_sample() {
    let (dir, _) = workspace();
    cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration"));

    let config_dir = dir.path().join(".config").join("ontobench");
    let config = fs::read_to_string(config_dir.join("config.toml")).unwrap();
    assert!(config.contains("endpoint = \"http://localhost:8000/sparql\""));
    assert!(config_dir.join("sample.ttl").exists());

    cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_stats_uses_configured_sample_after_init() {
    let (dir, _) = workspace();
    cmd(dir.path()).arg("init").assert().success();
    cmd(dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Application"));
}

// ─── Graph commands ─────────────────────────────────────────────────────

#[test]
fn test_stats_reports_counts_and_types() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["stats", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes:"))
        .stdout(predicate::str::contains("PhysicalServer"))
        .stdout(predicate::str::contains("deployedOn"));
}

#[test]
fn test_stats_missing_file_fails() {
    let (dir, _) = workspace();
    cmd(dir.path())
        .args(["stats", dir.path().join("nope.ttl").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load graph"));
}

#[test]
fn test_stats_invalid_turtle_fails() {
    let (dir, _) = workspace();
    let bad = dir.path().join("bad.ttl");
    fs::write(&bad, "<http://x/a> <http://x/p> .").unwrap();
    cmd(dir.path())
        .args(["stats", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("turtle parse error"));
}

#[test]
fn test_layout_prints_positions() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["layout", data.to_str().unwrap(), "--kind", "grid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grid"))
        .stdout(predicate::str::contains("web01"));
}

#[test]
fn test_layout_writes_json() {
    let (dir, data) = workspace();
    let out = dir.path().join("positions.json");
    cmd(dir.path())
        .args([
            "layout",
            data.to_str().unwrap(),
            "--kind",
            "circular",
            "--width",
            "600",
            "--height",
            "600",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed["layout"], "circular");
    let nodes = parsed["nodes"].as_array().unwrap();
    assert!(!nodes.is_empty());
    for node in nodes {
        let x = node["x"].as_f64().unwrap();
        let y = node["y"].as_f64().unwrap();
        assert!(x.is_finite() && y.is_finite());
    }
}

#[test]
fn test_details_by_short_name() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["details", "shop", "--data", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Application"))
        .stdout(predicate::str::contains("Outbound Relations"))
        .stdout(predicate::str::contains("dependsOn"));
}

#[test]
fn test_details_unknown_node_fails() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["details", "mainframe", "--data", data.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_export_all_formats() {
    let (dir, data) = workspace();
    for (format, file) in [
        ("json", "g.json"),
        ("graphml", "g.graphml"),
        ("svg", "g.svg"),
        ("csv", "g.csv"),
    ] {
        let out = dir.path().join(file);
        cmd(dir.path())
            .args([
                "export",
                data.to_str().unwrap(),
                "--format",
                format,
                "-o",
                out.to_str().unwrap(),
                "--layout",
                "tree",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("done"));
    }

    assert!(fs::read_to_string(dir.path().join("g.svg")).unwrap().contains("<svg"));
    assert!(fs::read_to_string(dir.path().join("g.graphml")).unwrap().contains("<graphml"));
    assert!(dir.path().join("g.nodes.csv").exists());
    assert!(dir.path().join("g.edges.csv").exists());
}

#[test]
fn test_viz_writes_page_without_opening() {
    let (dir, data) = workspace();
    let out = dir.path().join("viz.html");
    cmd(dir.path())
        .args([
            "viz",
            data.to_str().unwrap(),
            "--layout",
            "radial",
            "-o",
            out.to_str().unwrap(),
            "--no-open",
        ])
        .assert()
        .success();

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("Radial layout"));
}

// ─── SPARQL ─────────────────────────────────────────────────────────────

#[test]
fn test_query_sample_against_local_data() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["query", "--sample", "Applications", "--data", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2"))
        .stdout(predicate::str::contains("1 result"));
}

#[test]
fn test_query_ask_and_jsonld_renderer() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args([
            "query",
            "ASK { ?s a <https://w3id.org/devops-infra/Database> }",
            "--data",
            data.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    cmd(dir.path())
        .args([
            "query",
            "SELECT ?id WHERE { ?s <http://purl.org/dc/terms/identifier> ?id }",
            "--data",
            data.to_str().unwrap(),
            "--renderer",
            "jsonld",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"@context\""));
}

#[test]
fn test_query_unknown_renderer_fails() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["query", "--data", data.to_str().unwrap(), "--renderer", "pie-chart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown renderer"));
}

#[test]
fn test_query_renderer_cannot_handle_result() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["query", "--data", data.to_str().unwrap(), "--renderer", "turtle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot handle"));
}

#[test]
fn test_query_invalid_sparql_fails() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["query", "SELEC nothing", "--data", data.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed"));
}

#[test]
fn test_construct_visualize_filters_graph() {
    let (dir, data) = workspace();
    let out = dir.path().join("construct.html");
    cmd(dir.path())
        .args([
            "query",
            "CONSTRUCT { ?a <https://w3id.org/devops-infra/dependsOn> ?b } WHERE { ?a <https://w3id.org/devops-infra/dependsOn> ?b }",
            "--data",
            data.to_str().unwrap(),
            "--visualize",
            "-o",
            out.to_str().unwrap(),
            "--no-open",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 triples"))
        .stdout(predicate::str::contains("Showing 2 nodes, 1 edges"))
        .stdout(predicate::str::contains("Restored 8 nodes, 8 edges"));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("Showing a construct subgraph"));
    assert!(html.contains(r#"href="construct_full.html">Restore full graph</a>"#));

    let full = fs::read_to_string(dir.path().join("construct_full.html")).unwrap();
    assert!(full.contains("8 nodes &middot; 8 edges"));
    assert!(!full.contains("filter-banner\">"));
}

#[test]
fn test_query_unreachable_endpoint_fails() {
    let (dir, _) = workspace();
    cmd(dir.path())
        .args(["query", "--endpoint", "http://127.0.0.1:1/sparql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Query against http://127.0.0.1:1/sparql failed"));
}

#[test]
#[ignore = "requires a SPARQL server on localhost:8000"]
fn test_query_default_endpoint() {
    let (dir, _) = workspace();
    cmd(dir.path()).arg("query").assert().success();
}

// ─── Sessions ───────────────────────────────────────────────────────────

#[test]
fn test_session_replays_script() {
    let (dir, data) = workspace();
    let page = dir.path().join("session.html");
    let script = dir.path().join("steps.txt");
    fs::write(
        &script,
        format!(
            "# walk the graph\n\
             layout grid\n\
             click shop\n\
             navigate db\n\
             wait 500\n\
             drag-start vm1\n\
             drag-move vm1 300 200\n\
             drag-end vm1\n\
             wait 300\n\
             key +\n\
             key h --input\n\
             query CONSTRUCT {{ ?a <https://w3id.org/devops-infra/dependsOn> ?b }} \
             WHERE {{ ?a <https://w3id.org/devops-infra/dependsOn> ?b }}\n\
             restore\n\
             status\n\
             html {}\n",
            page.display()
        ),
    )
    .unwrap();

    cmd(dir.path())
        .args(["session", data.to_str().unwrap(), "--script", script.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("selected shop (Application)"))
        .stdout(predicate::str::contains("navigating to db"))
        .stdout(predicate::str::contains("released vm1, unpins after 300ms"))
        .stdout(predicate::str::contains("h: ignored"))
        .stdout(predicate::str::contains("filtered: showing 2 nodes, 1 edges"))
        .stdout(predicate::str::contains("restored: showing 8 nodes, 8 edges"))
        .stdout(predicate::str::contains("graph: 8 nodes, 8 edges (full)"))
        .stdout(predicate::str::contains("14 steps applied"));

    let html = fs::read_to_string(&page).unwrap();
    assert!(html.contains("Grid layout"));
    assert!(html.contains("let selectedId = null;"));
}

#[test]
fn test_session_reads_stdin() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["session", data.to_str().unwrap()])
        .write_stdin("click db\ndetails\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("deployedOn"))
        .stdout(predicate::str::contains("2 steps applied"));
}

#[test]
fn test_session_bad_step_reports_line() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["session", data.to_str().unwrap()])
        .write_stdin("status\n\nzoom sideways\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3: wrong arguments for 'zoom'"));
}

#[test]
fn test_session_unknown_node_fails_with_line() {
    let (dir, data) = workspace();
    cmd(dir.path())
        .args(["session", data.to_str().unwrap()])
        .write_stdin("status\nclick ghost\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step on line 2 failed"))
        .stderr(predicate::str::contains("Node 'ghost' not found"));
}
