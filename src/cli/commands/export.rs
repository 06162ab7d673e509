use anyhow::{Context, Result};
use console::{Emoji, style};
use std::path::PathBuf;

use super::layout::workbench;
use super::{load_graph, print_header, resolve_source};
use crate::cli::ExportFormat;
use crate::config::WorkbenchConfig;
use crate::layout::LayoutKind;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static FILE: Emoji<'_, '_> = Emoji("📁 ", "");

/// Ticks run before positions are exported.
const SETTLE_TICKS: usize = 300;

pub async fn run(
    data: Option<String>,
    format: ExportFormat,
    output: PathBuf,
    layout: Option<LayoutKind>,
) -> Result<()> {
    print_header("Export");

    let config = WorkbenchConfig::load_or_default()?;
    let source = resolve_source(data.as_deref(), &config);
    let graph = load_graph(&source).await?;

    let mut bench = workbench(&config, layout, None, None);
    bench.load(graph);
    bench.settle(SETTLE_TICKS);
    println!(
        "{}Laid out with {}",
        CHECK,
        style(bench.layout().display_name()).cyan()
    );

    let format_name = match format {
        ExportFormat::Json => "JSON",
        ExportFormat::Csv => "CSV",
        ExportFormat::Graphml => "GraphML",
        ExportFormat::Svg => "SVG",
    };

    print!("{}Exporting to {}... ", FILE, style(format_name).cyan());

    let written = match format {
        ExportFormat::Json => {
            crate::export::export_json(bench.graph(), bench.layout(), &output)?;
            vec![output]
        }
        ExportFormat::Csv => {
            let nodes_path = output.with_extension("nodes.csv");
            let edges_path = output.with_extension("edges.csv");
            crate::export::export_csv(bench.graph(), &nodes_path, &edges_path)?;
            vec![nodes_path, edges_path]
        }
        ExportFormat::Graphml => {
            crate::export::export_graphml(bench.graph(), &output)?;
            vec![output]
        }
        ExportFormat::Svg => {
            let svg = bench.to_svg().context("Nothing to render: the graph is empty")?;
            crate::export::export_document(&svg, &output)?;
            vec![output]
        }
    };

    println!("{}", style("done").green());
    println!();
    for path in &written {
        println!("  {} {}", style("→").dim(), style(path.display()).cyan().underlined());
    }
    println!();

    Ok(())
}
