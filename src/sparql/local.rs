use async_trait::async_trait;
use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use tracing::debug;

use super::{Binding, QueryExecutor, QueryOutcome, RdfTerm};
use crate::error::{WorkbenchError, WorkbenchResult};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// In-memory SPARQL store loaded from the same Turtle the graph view uses.
pub struct LocalStore {
    store: Store,
    label: String,
}

impl LocalStore {
    pub fn from_turtle(turtle: &str, label: impl Into<String>) -> WorkbenchResult<Self> {
        let store = Store::new()
            .map_err(|e| WorkbenchError::Query(format!("failed to create store: {e}")))?;
        store
            .load_from_reader(RdfFormat::Turtle, turtle.as_bytes())
            .map_err(|e| WorkbenchError::Parse(e.to_string()))?;
        let local = Self {
            store,
            label: label.into(),
        };
        debug!("Loaded {} triples into local store", local.len()?);
        Ok(local)
    }

    pub fn len(&self) -> WorkbenchResult<usize> {
        self.store
            .len()
            .map_err(|e| WorkbenchError::Query(format!("store error: {e}")))
    }

    pub fn is_empty(&self) -> WorkbenchResult<bool> {
        Ok(self.len()? == 0)
    }

    #[allow(deprecated)]
    fn run(&self, query: &str) -> WorkbenchResult<QueryOutcome> {
        let results = self
            .store
            .query(query)
            .map_err(|e| WorkbenchError::Query(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let variables = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution
                        .map_err(|e| WorkbenchError::Query(format!("solution error: {e}")))?;
                    let mut row = Binding::new();
                    for (var, term) in solution.iter() {
                        row.insert(var.as_str().to_string(), to_rdf_term(term));
                    }
                    rows.push(row);
                }
                Ok(QueryOutcome::Solutions { variables, rows })
            }
            QueryResults::Boolean(b) => Ok(QueryOutcome::Boolean(b)),
            QueryResults::Graph(triples) => {
                let mut turtle = String::new();
                for triple in triples {
                    let triple =
                        triple.map_err(|e| WorkbenchError::Query(format!("triple error: {e}")))?;
                    turtle.push_str(&triple.to_string());
                    turtle.push_str(" .\n");
                }
                Ok(QueryOutcome::Graph { turtle })
            }
        }
    }
}

#[async_trait]
impl QueryExecutor for LocalStore {
    async fn execute(&self, query: &str) -> WorkbenchResult<QueryOutcome> {
        self.run(query)
    }

    fn describe(&self) -> String {
        format!("local store ({})", self.label)
    }
}

#[allow(unreachable_patterns)]
fn to_rdf_term(term: &Term) -> RdfTerm {
    match term {
        Term::NamedNode(node) => RdfTerm::Uri {
            value: node.as_str().to_string(),
        },
        Term::BlankNode(node) => RdfTerm::Bnode {
            value: node.as_str().to_string(),
        },
        Term::Literal(lit) => {
            let datatype = lit.datatype().as_str();
            RdfTerm::Literal {
                value: lit.value().to_string(),
                datatype: (datatype != XSD_STRING && datatype != RDF_LANG_STRING)
                    .then(|| datatype.to_string()),
                lang: lit.language().map(str::to_string),
            }
        }
        other => RdfTerm::Literal {
            value: other.to_string(),
            datatype: None,
            lang: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"
        @prefix ex: <http://example.org/> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        ex:app a ex:Application ; ex:deployedOn ex:vm1 ; rdfs:label "App"@en .
        ex:vm1 a ex:VirtualMachine ; ex:cores 4 .
    "#;

    fn store() -> LocalStore {
        LocalStore::from_turtle(DATA, "test").unwrap()
    }

    #[test]
    fn test_load_counts_triples() {
        assert_eq!(store().len().unwrap(), 5);
    }

    #[test]
    fn test_bad_turtle_is_parse_error() {
        let err = LocalStore::from_turtle("ex:a ex:b", "bad").err().unwrap();
        assert!(matches!(err, WorkbenchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_select_terms() {
        let outcome = store()
            .execute(
                "SELECT ?label ?cores WHERE { <http://example.org/app> <http://www.w3.org/2000/01/rdf-schema#label> ?label . <http://example.org/vm1> <http://example.org/cores> ?cores }",
            )
            .await
            .unwrap();
        let QueryOutcome::Solutions { variables, rows } = outcome else {
            panic!("expected solutions");
        };
        assert_eq!(variables, vec!["label".to_string(), "cores".to_string()]);
        assert_eq!(
            rows[0]["label"],
            RdfTerm::Literal {
                value: "App".into(),
                datatype: None,
                lang: Some("en".into())
            }
        );
        assert_eq!(
            rows[0]["cores"],
            RdfTerm::Literal {
                value: "4".into(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#integer".into()),
                lang: None
            }
        );
    }

    #[tokio::test]
    async fn test_ask_and_construct() {
        let s = store();
        assert_eq!(
            s.execute("ASK { ?s a <http://example.org/VirtualMachine> }").await.unwrap(),
            QueryOutcome::Boolean(true)
        );
        let outcome = s
            .execute(
                "CONSTRUCT { ?s <http://example.org/deployedOn> ?o } \
                 WHERE { ?s <http://example.org/deployedOn> ?o }",
            )
            .await
            .unwrap();
        assert!(outcome.is_graph());
        assert_eq!(outcome.len(), 1);
        assert!(outcome.turtle().unwrap().contains("<http://example.org/vm1> ."));
    }

    #[tokio::test]
    async fn test_invalid_query() {
        let err = store().execute("SELEC nothing").await.unwrap_err();
        assert!(matches!(err, WorkbenchError::Query(_)));
    }
}
