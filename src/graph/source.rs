use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use super::GraphData;
use super::builder::GraphBuilder;
use crate::error::{WorkbenchError, WorkbenchResult};

/// Where the Turtle document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }

    /// Read the raw document text.
    pub async fn fetch(&self) -> WorkbenchResult<String> {
        match self {
            DataSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| WorkbenchError::Fetch {
                        source_name: path.display().to_string(),
                        message: e.to_string(),
                    })
            }
            DataSource::Url(url) => {
                let fetch_error = |message: String| WorkbenchError::Fetch {
                    source_name: url.clone(),
                    message,
                };
                let response = Client::new()
                    .get(url)
                    .header("Accept", "text/turtle")
                    .send()
                    .await
                    .map_err(|e| fetch_error(e.to_string()))?;

                if !response.status().is_success() {
                    let status = response.status();
                    warn!(%url, %status, "data fetch failed");
                    return Err(fetch_error(format!("HTTP {status}")));
                }

                response.text().await.map_err(|e| fetch_error(e.to_string()))
            }
        }
    }

    /// Fetch and parse. Callers treat any error as "nothing loaded".
    pub async fn load(&self) -> WorkbenchResult<GraphData> {
        Ok(self.load_document().await?.1)
    }

    /// Fetch and parse, keeping the document text alongside the graph.
    pub async fn load_document(&self) -> WorkbenchResult<(String, GraphData)> {
        let turtle = self.fetch().await?;
        info!(source = %self, bytes = turtle.len(), "fetched turtle document");
        let graph = GraphBuilder::from_turtle(&turtle)?;
        Ok((turtle, graph))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            DataSource::parse("https://example.org/sample.ttl"),
            DataSource::Url("https://example.org/sample.ttl".into())
        );
        assert_eq!(
            DataSource::parse("sample.ttl"),
            DataSource::File(PathBuf::from("sample.ttl"))
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("g.ttl");
        fs::write(
            &path,
            "<http://x/a> <http://x/p> <http://x/b> .\n<http://x/a> <http://x/name> \"a\" .\n",
        )
        .unwrap();

        let graph = DataSource::File(path).load().await.unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let source = DataSource::File(PathBuf::from("/definitely/not/here.ttl"));
        let result = tokio_test::block_on(source.load());
        assert!(matches!(result, Err(WorkbenchError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_invalid_turtle_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.ttl");
        fs::write(&path, "<http://x/a> <http://x/p> .").unwrap();
        let result = DataSource::File(path).load().await;
        assert!(matches!(result, Err(WorkbenchError::Parse(_))));
    }
}
