use anyhow::Result;
use console::{Emoji, style};
use std::path::PathBuf;
use tracing::info;

use super::{load_graph, print_header, resolve_source, spinner};
use crate::config::WorkbenchConfig;
use crate::layout::{LayoutKind, Viewport};
use crate::view::Workbench;

static COMPASS: Emoji<'_, '_> = Emoji("🧭 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static FILE: Emoji<'_, '_> = Emoji("📁 ", "");

/// Workbench with the configured settings, overridden from the command line.
pub(crate) fn workbench(
    config: &WorkbenchConfig,
    kind: Option<LayoutKind>,
    width: Option<f64>,
    height: Option<f64>,
) -> Workbench {
    let viewport = Viewport::new(
        width.unwrap_or(config.viewport.width),
        height.unwrap_or(config.viewport.height),
    );
    Workbench::new(
        viewport,
        kind.unwrap_or(config.layout.default),
        config.physics.clone(),
    )
}

pub async fn run(
    data: Option<String>,
    kind: Option<LayoutKind>,
    width: Option<f64>,
    height: Option<f64>,
    ticks: usize,
    output: Option<PathBuf>,
) -> Result<()> {
    print_header("Layout");

    let config = WorkbenchConfig::load_or_default()?;
    let source = resolve_source(data.as_deref(), &config);
    let graph = load_graph(&source).await?;

    let mut bench = workbench(&config, kind, width, height);
    let layout = bench.layout();
    let spinner = spinner(&COMPASS, &format!("Running {} layout...", layout.display_name()));
    bench.load(graph);
    let used = bench.settle(ticks);
    spinner.finish_and_clear();
    info!(layout = %layout, ticks = used, "layout settled");

    println!(
        "{}{} layout after {} ticks{}",
        CHECK,
        style(layout.display_name()).cyan().bold(),
        style(used).green(),
        if bench.simulation_active() {
            style(" (still moving)").yellow().to_string()
        } else {
            String::new()
        }
    );
    println!("  {}", style(layout.description()).dim());
    println!();

    match output {
        Some(path) => {
            crate::export::export_json(bench.graph(), layout, &path)?;
            println!(
                "{}Positions written to {}",
                FILE,
                style(path.display()).cyan().underlined()
            );
        }
        None => {
            println!(
                "  {:<30} {:<18} {:>9} {:>9}",
                style("Node").bold(),
                style("Type").bold(),
                style("x").bold(),
                style("y").bold()
            );
            for node in bench.graph().nodes() {
                println!(
                    "  {:<30} {:<18} {:>9.1} {:>9.1}",
                    style(node.display_name()).cyan(),
                    style(&node.kind).yellow(),
                    node.x,
                    node.y
                );
            }
        }
    }

    println!();

    Ok(())
}
