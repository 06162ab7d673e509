use anyhow::{Context, Result};
use console::{Emoji, style};
use std::path::{Path, PathBuf};

use super::layout::workbench;
use super::{load_graph, open_in_browser, output_path, print_header, resolve_source, spinner};
use crate::config::WorkbenchConfig;
use crate::layout::LayoutKind;
use crate::view::Workbench;
use crate::view::page::render_page;

static GRAPH: Emoji<'_, '_> = Emoji("🔗 ", "");
static BROWSER: Emoji<'_, '_> = Emoji("🌐 ", "");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Ticks run before the page snapshot is taken.
const SETTLE_TICKS: usize = 300;

/// Settle the layout and write the page to `path`.
pub(crate) fn write_page(
    bench: &mut Workbench,
    title: &str,
    path: &Path,
    restore_href: Option<&str>,
) -> Result<()> {
    let spinner = spinner(&GRAPH, "Settling layout...");
    bench.settle(SETTLE_TICKS);
    spinner.finish_and_clear();

    let html = render_page(bench, title, restore_href)
        .context("Nothing to visualize: the graph is empty")?;
    crate::export::export_document(&html, path)
}

/// Report a written page and optionally open it.
pub(crate) fn announce(path: &Path, open: bool) {
    println!();
    if open {
        open_in_browser(path);
        println!("{}Visualization opened in browser", BROWSER);
        println!();
    }
    println!("{}File: {}", SPARKLE, style(path.display()).cyan().underlined());
}

pub async fn run(
    data: Option<String>,
    layout: Option<LayoutKind>,
    output: Option<PathBuf>,
    no_open: bool,
) -> Result<()> {
    print_header("Graph Visualization");

    let config = WorkbenchConfig::load_or_default()?;
    let source = resolve_source(data.as_deref(), &config);
    let graph = load_graph(&source).await?;

    let mut bench = workbench(&config, layout, None, None);
    bench.load(graph);
    let html_path = output_path(output, "ontobench_viz.html");
    write_page(&mut bench, &source.to_string(), &html_path, None)?;
    announce(&html_path, !no_open);
    println!();

    Ok(())
}
