use thiserror::Error;

/// Errors raised by the workbench core (ingestion, layout, queries).
///
/// Command handlers wrap these in `anyhow` with additional context.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("failed to fetch {source_name}: {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    #[error("turtle parse error: {0}")]
    Parse(String),

    #[error("SPARQL query failed: {0}")]
    Query(String),

    #[error("node not found: {0}")]
    UnknownNode(String),

    #[error("no result renderer registered under '{0}'")]
    UnknownRenderer(String),

    #[error("renderer '{renderer}' cannot handle this result")]
    UnsupportedResult { renderer: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WorkbenchResult<T> = std::result::Result<T, WorkbenchError>;
