pub mod details;
pub mod export;
pub mod init;
pub mod layout;
pub mod query;
pub mod session;
pub mod stats;
pub mod viz;

use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::WorkbenchConfig;
use crate::graph::GraphData;
use crate::graph::source::DataSource;

static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");

pub(crate) fn print_header(title: &str) {
    println!();
    println!("{}", style(format!(" Ontobench - {title} ")).bold().reverse());
    println!();
}

pub(crate) fn spinner(emoji: &Emoji<'_, '_>, message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(&format!("{}{{spinner:.green}} {{msg}}", emoji))
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

/// Source given on the command line, else the configured one.
pub(crate) fn resolve_source(data: Option<&str>, config: &WorkbenchConfig) -> DataSource {
    DataSource::parse(data.unwrap_or(&config.data.source))
}

/// Fetch and parse the Turtle document behind `source`.
pub(crate) async fn load_graph(source: &DataSource) -> Result<GraphData> {
    Ok(load_document(source).await?.1)
}

/// Like [`load_graph`], also returning the Turtle text.
pub(crate) async fn load_document(source: &DataSource) -> Result<(String, GraphData)> {
    let spinner = spinner(&DOCUMENT, &format!("Loading {}...", source));
    let result = source.load_document().await;
    spinner.finish_and_clear();

    let (turtle, graph) =
        result.with_context(|| format!("Failed to load graph from {}", source))?;
    println!(
        "{}Loaded {} nodes, {} edges from {}",
        CHECK,
        style(graph.node_count()).green().bold(),
        style(graph.edge_count()).green().bold(),
        style(source).cyan()
    );
    Ok((turtle, graph))
}

/// `path`, or a file under the system temp directory.
pub(crate) fn output_path(path: Option<PathBuf>, default_name: &str) -> PathBuf {
    path.unwrap_or_else(|| std::env::temp_dir().join(default_name))
}

/// Try to open a file in the default browser; failures are ignored.
pub(crate) fn open_in_browser(path: &Path) {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn().ok();
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn().ok();
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", path.to_str().unwrap_or("")])
            .spawn()
            .ok();
    }
}
