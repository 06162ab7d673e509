use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{QueryExecutor, QueryForm, QueryOutcome};
use crate::error::{WorkbenchError, WorkbenchResult};

/// A SPARQL protocol endpoint reached over HTTP.
pub struct RemoteEndpoint {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl RemoteEndpoint {
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryExecutor for RemoteEndpoint {
    async fn execute(&self, query: &str) -> WorkbenchResult<QueryOutcome> {
        let form = QueryForm::detect(query);
        debug!(endpoint = %self.endpoint, %form, "sending SPARQL query");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", form.accept_header())
            .form(&[("query", query)])
            .send()
            .await
            .map_err(|e| {
                WorkbenchError::Query(format!("request to {} failed: {e}", self.endpoint))
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body = response
            .text()
            .await
            .map_err(|e| WorkbenchError::Query(e.to_string()))?;

        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "SPARQL endpoint returned an error");
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}: {}", body.trim()));
            return Err(WorkbenchError::Query(message));
        }

        if content_type.contains("json") {
            QueryOutcome::from_sparql_json(&body)
        } else if content_type.is_empty() && !form.returns_graph() {
            QueryOutcome::from_sparql_json(&body)
        } else {
            Ok(QueryOutcome::Graph { turtle: body })
        }
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
