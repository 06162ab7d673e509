pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::layout::LayoutKind;

#[derive(Parser)]
#[command(name = "ontobench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Explore Turtle knowledge graphs: layouts, node details and SPARQL",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the default configuration and a sample dataset
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Show node, edge, type and predicate statistics
    Stats {
        /// Turtle file path or http(s) URL (defaults to the configured source)
        data: Option<String>,
    },

    /// Run a layout preset and print or save the node positions
    Layout {
        /// Turtle file path or http(s) URL (defaults to the configured source)
        data: Option<String>,

        /// Layout preset (defaults to the configured layout)
        #[arg(short, long)]
        kind: Option<LayoutKind>,

        /// Viewport width
        #[arg(long)]
        width: Option<f64>,

        /// Viewport height
        #[arg(long)]
        height: Option<f64>,

        /// Maximum simulation ticks
        #[arg(short, long, default_value = "300")]
        ticks: usize,

        /// Write positions as JSON instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a node's type, URI and relations
    Details {
        /// Node URI, or its short name when unambiguous
        node: String,

        /// Turtle file path or http(s) URL (defaults to the configured source)
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Export the laid-out graph to various formats
    Export {
        /// Turtle file path or http(s) URL (defaults to the configured source)
        data: Option<String>,

        /// Export format
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Layout preset used for positions
        #[arg(short, long)]
        layout: Option<LayoutKind>,
    },

    /// Run a SPARQL query against the local data or a remote endpoint
    Query {
        /// SPARQL query text (defaults to the built-in query)
        query: Option<String>,

        /// Run a named sample query instead ("Servers & VMs", "Applications", "Dependencies")
        #[arg(short, long, conflicts_with = "query")]
        sample: Option<String>,

        /// Query an in-memory store loaded from this Turtle source
        #[arg(short, long, conflicts_with = "endpoint")]
        data: Option<String>,

        /// SPARQL endpoint URL (defaults to the configured endpoint)
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Result renderer (table, construct, jsonld, turtle, trig)
        #[arg(short, long)]
        renderer: Option<String>,

        /// Show CONSTRUCT/DESCRIBE results as a filtered view of the graph
        #[arg(long, default_value = "false")]
        visualize: bool,

        /// Write the visualization here instead of a temporary file
        #[arg(short, long, requires = "visualize")]
        output: Option<PathBuf>,

        /// Do not open the visualization in a browser
        #[arg(long, default_value = "false")]
        no_open: bool,
    },

    /// Render the graph to an interactive HTML page
    Viz {
        /// Turtle file path or http(s) URL (defaults to the configured source)
        data: Option<String>,

        /// Layout preset (defaults to the configured layout)
        #[arg(short, long)]
        layout: Option<LayoutKind>,

        /// Write the page here instead of a temporary file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not open the page in a browser
        #[arg(long, default_value = "false")]
        no_open: bool,
    },

    /// Replay a script of interaction events (clicks, drags, zoom, queries)
    Session {
        /// Turtle file path or http(s) URL (defaults to the configured source)
        data: Option<String>,

        /// Script file, one step per line (reads stdin when omitted)
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Layout preset (defaults to the configured layout)
        #[arg(short, long)]
        layout: Option<LayoutKind>,

        /// Viewport width
        #[arg(long)]
        width: Option<f64>,

        /// Viewport height
        #[arg(long)]
        height: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Graphml,
    Svg,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Graphml => write!(f, "graphml"),
            ExportFormat::Svg => write!(f, "svg"),
        }
    }
}
