use anyhow::{Result, bail};
use console::{Emoji, style};

use super::{load_graph, print_header, resolve_source};
use crate::config::WorkbenchConfig;
use crate::graph::GraphData;
use crate::view::details::NodeDetails;

static PIN: Emoji<'_, '_> = Emoji("📍 ", "");
static OUT: Emoji<'_, '_> = Emoji("➡️  ", "-> ");
static IN: Emoji<'_, '_> = Emoji("⬅️  ", "<- ");

/// Exact URI match first, then a unique short-name match.
pub(crate) fn resolve_node(graph: &GraphData, query: &str) -> Result<String> {
    if graph.node(query).is_some() {
        return Ok(query.to_string());
    }
    let matches: Vec<&str> = graph
        .nodes()
        .filter(|n| n.display_name().eq_ignore_ascii_case(query))
        .map(|n| n.id.as_str())
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("Node '{}' not found", query),
        many => bail!(
            "Node name '{}' is ambiguous; use one of:\n  {}",
            query,
            many.join("\n  ")
        ),
    }
}

pub async fn run(node: String, data: Option<String>) -> Result<()> {
    print_header("Node Details");

    let config = WorkbenchConfig::load_or_default()?;
    let source = resolve_source(data.as_deref(), &config);
    let graph = load_graph(&source).await?;

    let id = resolve_node(&graph, &node)?;
    let details = NodeDetails::for_node(&graph, &id)?;

    println!();
    println!("{}{}", PIN, style(&details.name).cyan().bold());
    println!("  {} {}", style("Type:").bold(), style(&details.kind).yellow());
    println!("  {} {}", style("URI:").bold(), style(&details.id).dim());

    if !details.outbound.is_empty() {
        println!();
        println!("{}Outbound Relations", OUT);
        for rel in &details.outbound {
            println!(
                "  {:<20} → {}",
                style(&rel.predicate).blue(),
                style(&rel.node_name).cyan()
            );
        }
    }

    if !details.inbound.is_empty() {
        println!();
        println!("{}Inbound Relations", IN);
        for rel in &details.inbound {
            println!(
                "  {:<20} ← {}",
                style(&rel.predicate).blue(),
                style(&rel.node_name).cyan()
            );
        }
    }

    if !details.has_relations() {
        println!();
        println!("  {}", style("No relations found").dim().italic());
    }

    println!();

    Ok(())
}
