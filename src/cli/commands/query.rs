use anyhow::{Context, Result, bail};
use console::{Emoji, style};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::layout::workbench;
use super::viz::{announce, write_page};
use super::{output_path, print_header, resolve_source, spinner};
use crate::config::WorkbenchConfig;
use crate::graph::GraphData;
use crate::graph::filter::{FilterSource, GraphFilter};
use crate::graph::source::DataSource;
use crate::sparql::queries::{DEFAULT_QUERY, SAMPLE_QUERIES, find_sample};
use crate::sparql::{
    LocalStore, QueryExecutor, QueryForm, RemoteEndpoint, RenderedResult, RendererRegistry,
};

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static FILTER: Emoji<'_, '_> = Emoji("🎯 ", "");
static RESTORE: Emoji<'_, '_> = Emoji("↩️  ", "");

/// Longest query excerpt shown in the filter banner.
const DESCRIPTION_CHARS: usize = 80;

pub struct QueryOptions {
    pub query: Option<String>,
    pub sample: Option<String>,
    pub data: Option<String>,
    pub endpoint: Option<String>,
    pub renderer: Option<String>,
    pub visualize: bool,
    pub output: Option<PathBuf>,
    pub no_open: bool,
}

fn query_text(options: &QueryOptions) -> Result<String> {
    if let Some(name) = &options.sample {
        let Some(sample) = find_sample(name) else {
            let names: Vec<&str> = SAMPLE_QUERIES.iter().map(|s| s.name).collect();
            bail!(
                "Unknown sample query '{}'. Available: {}",
                name,
                names.join(", ")
            );
        };
        return Ok(sample.query.to_string());
    }
    Ok(options
        .query
        .clone()
        .unwrap_or_else(|| DEFAULT_QUERY.to_string()))
}

/// Sibling page holding the restored, unfiltered graph.
fn full_graph_path(filtered: &Path) -> PathBuf {
    let stem = filtered
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ontobench_query".to_string());
    filtered.with_file_name(format!("{stem}_full.html"))
}

/// First line of the query body, skipping prologue and comments.
pub(crate) fn describe_query(query: &str) -> String {
    let line = query
        .lines()
        .map(str::trim)
        .find(|l| {
            let upper = l.to_ascii_uppercase();
            !l.is_empty()
                && !l.starts_with('#')
                && !upper.starts_with("PREFIX")
                && !upper.starts_with("BASE")
        })
        .unwrap_or("");
    match line.char_indices().nth(DESCRIPTION_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

async fn executor(
    options: &QueryOptions,
    config: &WorkbenchConfig,
) -> Result<Box<dyn QueryExecutor>> {
    match &options.data {
        Some(data) => {
            let source = DataSource::parse(data);
            let turtle = source
                .fetch()
                .await
                .with_context(|| format!("Failed to load data from {}", source))?;
            let store = LocalStore::from_turtle(&turtle, source.to_string())
                .with_context(|| format!("Failed to parse {}", source))?;
            Ok(Box::new(store))
        }
        None => {
            let endpoint = options
                .endpoint
                .as_deref()
                .unwrap_or(&config.sparql.endpoint);
            Ok(Box::new(RemoteEndpoint::new(endpoint)))
        }
    }
}

pub async fn run(options: QueryOptions) -> Result<()> {
    print_header("SPARQL Query");

    let config = WorkbenchConfig::load_or_default()?;
    let query = query_text(&options)?;
    let form = QueryForm::detect(&query);
    let registry = RendererRegistry::with_builtins();

    if let Some(key) = &options.renderer
        && registry.get(key).is_none()
    {
        let keys: Vec<&str> = registry.keys().collect();
        bail!("Unknown renderer '{}'. Available: {}", key, keys.join(", "));
    }

    let executor = executor(&options, &config).await?;
    let target = executor.describe();

    let spinner = spinner(&SEARCH, &format!("Running {} query against {}...", form, target));
    let result = executor.execute(&query).await;
    spinner.finish_and_clear();
    let outcome = result.with_context(|| format!("Query against {} failed", target))?;

    let (label, rendered): (&str, RenderedResult) = match &options.renderer {
        Some(key) => {
            let rendered = registry.render_with(key, &outcome)?;
            let label = registry.get(key).map(|r| r.label()).unwrap_or("");
            (label, rendered)
        }
        None => {
            let Some(renderer) = registry.best_for(&outcome) else {
                bail!("No renderer can display this result");
            };
            (renderer.label(), renderer.render(&outcome)?)
        }
    };

    println!(
        "{}{} {} from {} ({})",
        CHECK,
        style(outcome.len()).green().bold(),
        if outcome.is_graph() { "triples" } else { "results" },
        style(&target).cyan(),
        style(label).dim()
    );
    println!();
    print!("{}", rendered.text);
    if !rendered.text.ends_with('\n') {
        println!();
    }

    if options.visualize {
        let Some(payload) = rendered
            .graph_payload
            .as_deref()
            .or_else(|| outcome.turtle())
        else {
            println!();
            println!(
                "{}Only CONSTRUCT and DESCRIBE results can be visualized",
                WARN
            );
            return Ok(());
        };

        let source = resolve_source(options.data.as_deref(), &config);
        let base = match source.load().await {
            Ok(graph) => graph,
            Err(e) => {
                warn!(
                    source = %source,
                    error = %e,
                    "base graph unavailable, showing the result alone"
                );
                GraphData::new()
            }
        };

        let mut bench = workbench(&config, None, None, None);
        bench.load(base);
        bench
            .apply_filter(payload, FilterSource::Construct, Some(describe_query(&query)))
            .context("Query result is not valid Turtle")?;

        println!();
        println!(
            "{}Showing {} nodes, {} edges of the {} graph",
            FILTER,
            style(bench.graph().node_count()).green().bold(),
            style(bench.graph().edge_count()).green().bold(),
            style("filtered").yellow()
        );

        let html_path = output_path(options.output.clone(), "ontobench_query.html");
        let full_path = full_graph_path(&html_path);
        let has_base = matches!(
            bench.filter(),
            GraphFilter::Filtered { original, .. } if !original.is_empty()
        );
        let full_href = full_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|_| has_base);
        write_page(&mut bench, "CONSTRUCT result", &html_path, full_href.as_deref())?;

        if full_href.is_some() && bench.restore() {
            write_page(&mut bench, &source.to_string(), &full_path, None)?;
            println!(
                "{}Restored {} nodes, {} edges: {}",
                RESTORE,
                style(bench.graph().node_count()).green().bold(),
                style(bench.graph().edge_count()).green().bold(),
                style(full_path.display()).cyan().underlined()
            );
        }
        announce(&html_path, !options.no_open);
    }

    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> QueryOptions {
        QueryOptions {
            query: None,
            sample: None,
            data: None,
            endpoint: None,
            renderer: None,
            visualize: false,
            output: None,
            no_open: true,
        }
    }

    #[test]
    fn test_query_text_defaults_and_samples() {
        assert_eq!(query_text(&options()).unwrap(), DEFAULT_QUERY);

        let mut opts = options();
        opts.sample = Some("dependencies".into());
        assert!(query_text(&opts).unwrap().contains("devops:dependsOn"));

        opts.sample = Some("bogus".into());
        let err = query_text(&opts).unwrap_err().to_string();
        assert!(err.contains("Servers & VMs"));
    }

    #[test]
    fn test_full_graph_path_is_a_sibling() {
        assert_eq!(
            full_graph_path(Path::new("/tmp/out/result.html")),
            PathBuf::from("/tmp/out/result_full.html")
        );
    }

    #[test]
    fn test_describe_query_skips_prologue() {
        let q = "PREFIX ex: <http://x/>\n# comment\n\nCONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }";
        assert_eq!(describe_query(q), "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }");
        let long = format!("SELECT {}", "?x ".repeat(60));
        assert!(describe_query(&long).ends_with("..."));
    }
}
