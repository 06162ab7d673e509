mod cli;
mod config;
mod error;
mod export;
mod graph;
mod layout;
mod sparql;
mod view;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::commands::query::QueryOptions;
use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Only warnings by default; RUST_LOG=info or debug for more detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force).await?;
        }
        Commands::Stats { data } => {
            cli::commands::stats::run(data).await?;
        }
        Commands::Layout {
            data,
            kind,
            width,
            height,
            ticks,
            output,
        } => {
            cli::commands::layout::run(data, kind, width, height, ticks, output).await?;
        }
        Commands::Details { node, data } => {
            cli::commands::details::run(node, data).await?;
        }
        Commands::Export {
            data,
            format,
            output,
            layout,
        } => {
            cli::commands::export::run(data, format, output, layout).await?;
        }
        Commands::Query {
            query,
            sample,
            data,
            endpoint,
            renderer,
            visualize,
            output,
            no_open,
        } => {
            cli::commands::query::run(QueryOptions {
                query,
                sample,
                data,
                endpoint,
                renderer,
                visualize,
                output,
                no_open,
            })
            .await?;
        }
        Commands::Viz {
            data,
            layout,
            output,
            no_open,
        } => {
            cli::commands::viz::run(data, layout, output, no_open).await?;
        }
        Commands::Session {
            data,
            script,
            layout,
            width,
            height,
        } => {
            cli::commands::session::run(data, script, layout, width, height).await?;
        }
    }

    Ok(())
}
