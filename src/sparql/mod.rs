pub mod local;
pub mod plugins;
pub mod queries;
pub mod remote;

use async_trait::async_trait;
use oxigraph::io::{RdfFormat, RdfParser};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{WorkbenchError, WorkbenchResult};

pub use local::LocalStore;
pub use plugins::{RenderedResult, RendererRegistry, ResultRenderer};
pub use remote::RemoteEndpoint;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const TURTLE: &str = "text/turtle";

static RE_IRI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>\s]*>").unwrap());
static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)#.*$").unwrap());
static RE_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(SELECT|ASK|CONSTRUCT|DESCRIBE)\b").unwrap());

/// The four SPARQL query forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
    Describe,
}

impl QueryForm {
    /// First query-form keyword outside IRIs and comments; SELECT if none.
    pub fn detect(query: &str) -> Self {
        let without_iris = RE_IRI.replace_all(query, "<>");
        let cleaned = RE_COMMENT.replace_all(&without_iris, "");
        RE_FORM
            .captures(&cleaned)
            .map(|caps| match caps[1].to_ascii_uppercase().as_str() {
                "ASK" => QueryForm::Ask,
                "CONSTRUCT" => QueryForm::Construct,
                "DESCRIBE" => QueryForm::Describe,
                _ => QueryForm::Select,
            })
            .unwrap_or(QueryForm::Select)
    }

    pub fn returns_graph(&self) -> bool {
        matches!(self, QueryForm::Construct | QueryForm::Describe)
    }

    pub fn accept_header(&self) -> &'static str {
        if self.returns_graph() {
            TURTLE
        } else {
            SPARQL_RESULTS_JSON
        }
    }
}

impl fmt::Display for QueryForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryForm::Select => "SELECT",
            QueryForm::Ask => "ASK",
            QueryForm::Construct => "CONSTRUCT",
            QueryForm::Describe => "DESCRIBE",
        };
        write!(f, "{name}")
    }
}

/// An RDF term in the SPARQL 1.1 JSON results shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RdfTerm {
    Uri {
        value: String,
    },
    #[serde(alias = "typed-literal")]
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, rename = "xml:lang", skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
    Bnode {
        value: String,
    },
}

impl RdfTerm {
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Uri { value } | RdfTerm::Literal { value, .. } | RdfTerm::Bnode { value } => {
                value
            }
        }
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfTerm::Uri { value } => write!(f, "<{value}>"),
            RdfTerm::Bnode { value } => write!(f, "_:{value}"),
            RdfTerm::Literal {
                value,
                lang: Some(lang),
                ..
            } => write!(f, "\"{value}\"@{lang}"),
            RdfTerm::Literal {
                value,
                datatype: Some(dt),
                ..
            } => write!(f, "\"{value}\"^^<{dt}>"),
            RdfTerm::Literal { value, .. } => write!(f, "\"{value}\""),
        }
    }
}

pub type Binding = BTreeMap<String, RdfTerm>;

/// Result of one query, independent of where it ran.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Solutions {
        variables: Vec<String>,
        rows: Vec<Binding>,
    },
    Boolean(bool),
    /// CONSTRUCT/DESCRIBE output as Turtle (N-Triples is valid Turtle).
    Graph { turtle: String },
}

#[derive(Debug, Deserialize)]
struct SparqlJson {
    #[serde(default)]
    head: SparqlHead,
    results: Option<SparqlBindings>,
    boolean: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SparqlHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<Binding>,
}

impl QueryOutcome {
    /// Parse a `application/sparql-results+json` document.
    pub fn from_sparql_json(text: &str) -> WorkbenchResult<Self> {
        let doc: SparqlJson = serde_json::from_str(text)
            .map_err(|e| WorkbenchError::Query(format!("invalid SPARQL JSON results: {e}")))?;
        match (doc.results, doc.boolean) {
            (Some(results), _) => Ok(QueryOutcome::Solutions {
                variables: doc.head.vars,
                rows: results.bindings,
            }),
            (None, Some(b)) => Ok(QueryOutcome::Boolean(b)),
            (None, None) => Err(WorkbenchError::Query(
                "SPARQL JSON has neither results nor boolean".into(),
            )),
        }
    }

    pub fn to_sparql_json(&self) -> Value {
        match self {
            QueryOutcome::Solutions { variables, rows } => json!({
                "head": { "vars": variables },
                "results": { "bindings": rows },
            }),
            QueryOutcome::Boolean(b) => json!({ "head": {}, "boolean": b }),
            QueryOutcome::Graph { turtle } => json!({ "head": {}, "turtle": turtle }),
        }
    }

    pub fn is_graph(&self) -> bool {
        matches!(self, QueryOutcome::Graph { .. })
    }

    pub fn turtle(&self) -> Option<&str> {
        match self {
            QueryOutcome::Graph { turtle } => Some(turtle),
            _ => None,
        }
    }

    /// Rows for solutions, triples for graphs, 1 for a boolean.
    pub fn len(&self) -> usize {
        match self {
            QueryOutcome::Solutions { rows, .. } => rows.len(),
            QueryOutcome::Boolean(_) => 1,
            QueryOutcome::Graph { turtle } => count_triples(turtle),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of triples in a Turtle document; stops at the first syntax error.
pub fn count_triples(turtle: &str) -> usize {
    RdfParser::from_format(RdfFormat::Turtle)
        .for_reader(turtle.as_bytes())
        .take_while(Result::is_ok)
        .count()
}

/// Something that can answer SPARQL queries.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> WorkbenchResult<QueryOutcome>;

    /// Human-readable target, for logs and output.
    fn describe(&self) -> String;
}
