use anyhow::Result;
use console::{Emoji, style};

use super::{load_graph, print_header, resolve_source};
use crate::config::WorkbenchConfig;
use crate::graph::{analytics, display_name, predicate_label};

static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
static GRAPH: Emoji<'_, '_> = Emoji("🔗 ", "");
static TAG: Emoji<'_, '_> = Emoji("🏷️  ", "");

pub async fn run(data: Option<String>) -> Result<()> {
    print_header("Graph Statistics");

    let config = WorkbenchConfig::load_or_default()?;
    let source = resolve_source(data.as_deref(), &config);
    let graph = load_graph(&source).await?;
    let stats = analytics::compute_stats(&graph);

    println!();
    println!("{}Graph Overview", CHART);
    println!();
    println!(
        "  {} Nodes:                {}",
        style("•").cyan(),
        style(stats.node_count).green().bold()
    );
    println!(
        "  {} Edges:                {}",
        style("•").cyan(),
        style(stats.edge_count).green().bold()
    );
    println!(
        "  {} Connected components: {}",
        style("•").cyan(),
        style(stats.connected_components).green().bold()
    );
    println!(
        "  {} Density:              {}",
        style("•").cyan(),
        style(format!("{:.4}", stats.density)).green()
    );
    println!(
        "  {} Avg degree:           {}",
        style("•").cyan(),
        style(format!("{:.1}", stats.avg_degree)).green()
    );
    println!(
        "  {} Max degree:           {}",
        style("•").cyan(),
        style(stats.max_degree).green().bold()
    );

    if !stats.type_counts.is_empty() {
        println!();
        println!("{}Node Types", TAG);
        println!();
        for (kind, count) in &stats.type_counts {
            let bar = "█".repeat((*count).min(30));
            println!(
                "  {:<25} {} ({})",
                style(kind).yellow(),
                style(&bar).green(),
                style(count).dim(),
            );
        }
    }

    if !stats.predicate_counts.is_empty() {
        println!();
        println!("{}Predicates", CHART);
        println!();
        for (predicate, count) in &stats.predicate_counts {
            let bar = "█".repeat((*count).min(30));
            println!(
                "  {:<25} {} ({})",
                style(predicate_label(predicate)).yellow(),
                style(&bar).blue(),
                style(count).dim(),
            );
        }
    }

    if !stats.top_degree.is_empty() {
        println!();
        println!("{}Most Connected Nodes", GRAPH);
        println!();
        for (i, (id, degree)) in stats.top_degree.iter().enumerate() {
            let bar = "█".repeat((*degree).min(30));
            println!(
                "  {:>2}. {:<30} {} ({})",
                i + 1,
                style(display_name(id)).cyan().bold(),
                style(&bar).blue(),
                style(degree).dim(),
            );
        }
    }

    println!();

    Ok(())
}
