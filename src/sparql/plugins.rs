use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Triple;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::debug;

use super::queries::compact_iri;
use super::{QueryOutcome, RdfTerm};
use crate::error::{WorkbenchError, WorkbenchResult};

/// Characters of Turtle shown by the graph view before truncating.
pub const PREVIEW_CHARS: usize = 500;

/// Output of a renderer. `graph_payload` is Turtle that can be handed to
/// the workbench as a filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub text: String,
    pub graph_payload: Option<String>,
}

impl RenderedResult {
    fn text(text: String) -> Self {
        Self {
            text,
            graph_payload: None,
        }
    }
}

/// A pluggable view over query results.
pub trait ResultRenderer: Send + Sync {
    fn key(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn priority(&self) -> i32;
    fn can_handle(&self, outcome: &QueryOutcome) -> bool;
    fn render(&self, outcome: &QueryOutcome) -> WorkbenchResult<RenderedResult>;
}

/// Renderers keyed by name.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: BTreeMap<String, Box<dyn ResultRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TableRenderer));
        registry.register(Box::new(ConstructRenderer));
        registry.register(Box::new(JsonLdRenderer));
        registry.register(Box::new(TurtleRenderer));
        registry.register(Box::new(TrigRenderer));
        registry
    }

    /// Registering an existing key replaces the previous renderer.
    pub fn register(&mut self, renderer: Box<dyn ResultRenderer>) {
        let key = renderer.key().to_string();
        if self.renderers.insert(key.clone(), renderer).is_some() {
            debug!(%key, "replaced result renderer");
        }
    }

    pub fn get(&self, key: &str) -> Option<&dyn ResultRenderer> {
        self.renderers.get(key).map(|r| r.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Highest-priority renderer that can handle the outcome; ties go to the
    /// alphabetically first key.
    pub fn best_for(&self, outcome: &QueryOutcome) -> Option<&dyn ResultRenderer> {
        let mut best: Option<&dyn ResultRenderer> = None;
        for renderer in self.renderers.values() {
            if !renderer.can_handle(outcome) {
                continue;
            }
            if best.is_none_or(|b| renderer.priority() > b.priority()) {
                best = Some(renderer.as_ref());
            }
        }
        best
    }

    pub fn render_with(
        &self,
        key: &str,
        outcome: &QueryOutcome,
    ) -> WorkbenchResult<RenderedResult> {
        let renderer = self
            .get(key)
            .ok_or_else(|| WorkbenchError::UnknownRenderer(key.to_string()))?;
        if !renderer.can_handle(outcome) {
            return Err(WorkbenchError::UnsupportedResult {
                renderer: key.to_string(),
            });
        }
        renderer.render(outcome)
    }
}

fn unsupported(key: &str) -> WorkbenchError {
    WorkbenchError::UnsupportedResult {
        renderer: key.to_string(),
    }
}

fn cell(term: &RdfTerm) -> String {
    match term {
        RdfTerm::Uri { value } => compact_iri(value),
        RdfTerm::Bnode { value } => format!("_:{value}"),
        RdfTerm::Literal {
            value,
            lang: Some(lang),
            ..
        } => format!("{value}@{lang}"),
        other => other.value().to_string(),
    }
}

/// Column-aligned text table for SELECT rows and ASK answers.
pub struct TableRenderer;

impl ResultRenderer for TableRenderer {
    fn key(&self) -> &'static str {
        "table"
    }

    fn label(&self) -> &'static str {
        "Table"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn can_handle(&self, outcome: &QueryOutcome) -> bool {
        !outcome.is_graph()
    }

    fn render(&self, outcome: &QueryOutcome) -> WorkbenchResult<RenderedResult> {
        let (variables, rows) = match outcome {
            QueryOutcome::Boolean(b) => return Ok(RenderedResult::text(format!("{b}\n"))),
            QueryOutcome::Solutions { variables, rows } => (variables, rows),
            QueryOutcome::Graph { .. } => return Err(unsupported(self.key())),
        };

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                variables
                    .iter()
                    .map(|v| row.get(v).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = variables
            .iter()
            .enumerate()
            .map(|(i, v)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(v.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let line = |values: &[String], out: &mut String| {
            let padded: Vec<String> = values
                .iter()
                .zip(&widths)
                .map(|(value, &width)| format!("{value:<width$}"))
                .collect();
            let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
        };
        line(variables, &mut out);
        let _ = writeln!(
            out,
            "{}",
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-")
        );
        for row in &cells {
            line(row, &mut out);
        }
        let _ = writeln!(
            out,
            "\n{} result{}",
            rows.len(),
            if rows.len() == 1 { "" } else { "s" }
        );
        Ok(RenderedResult::text(out))
    }
}

/// Graph view for CONSTRUCT/DESCRIBE: summary, truncated preview and the
/// Turtle payload for filtering the workbench.
pub struct ConstructRenderer;

impl ResultRenderer for ConstructRenderer {
    fn key(&self) -> &'static str {
        "construct"
    }

    fn label(&self) -> &'static str {
        "Graph View"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn can_handle(&self, outcome: &QueryOutcome) -> bool {
        outcome.is_graph()
    }

    fn render(&self, outcome: &QueryOutcome) -> WorkbenchResult<RenderedResult> {
        let turtle = outcome.turtle().ok_or_else(|| unsupported(self.key()))?;
        let preview = match turtle.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}\n\n... (truncated)", &turtle[..cut]),
            None => turtle.to_string(),
        };
        let text = format!(
            "CONSTRUCT Query Results\nFound {} triples\n\n{}\n",
            outcome.len(),
            preview.trim_end()
        );
        Ok(RenderedResult {
            text,
            graph_payload: Some(turtle.to_string()),
        })
    }
}

/// SELECT rows as a JSON-LD document with one object per solution.
pub struct JsonLdRenderer;

impl ResultRenderer for JsonLdRenderer {
    fn key(&self) -> &'static str {
        "jsonld"
    }

    fn label(&self) -> &'static str {
        "JSON-LD"
    }

    fn priority(&self) -> i32 {
        5
    }

    fn can_handle(&self, outcome: &QueryOutcome) -> bool {
        matches!(outcome, QueryOutcome::Solutions { .. })
    }

    fn render(&self, outcome: &QueryOutcome) -> WorkbenchResult<RenderedResult> {
        let QueryOutcome::Solutions { variables, rows } = outcome else {
            return Err(unsupported(self.key()));
        };
        let context: Map<String, Value> = variables
            .iter()
            .map(|v| (v.clone(), Value::String(format!("ex:{v}"))))
            .collect();
        let graph: Vec<Value> = rows
            .iter()
            .map(|row| {
                Value::Object(
                    row.iter()
                        .map(|(k, term)| (k.clone(), Value::String(term.value().to_string())))
                        .collect(),
                )
            })
            .collect();
        let doc = json!({ "@context": context, "@graph": graph });
        let text = serde_json::to_string_pretty(&doc)
            .map_err(|e| WorkbenchError::Query(e.to_string()))?;
        Ok(RenderedResult::text(text + "\n"))
    }
}

/// Raw Turtle of a graph result.
pub struct TurtleRenderer;

impl ResultRenderer for TurtleRenderer {
    fn key(&self) -> &'static str {
        "turtle"
    }

    fn label(&self) -> &'static str {
        "Turtle"
    }

    fn priority(&self) -> i32 {
        4
    }

    fn can_handle(&self, outcome: &QueryOutcome) -> bool {
        outcome.is_graph()
    }

    fn render(&self, outcome: &QueryOutcome) -> WorkbenchResult<RenderedResult> {
        let turtle = outcome.turtle().ok_or_else(|| unsupported(self.key()))?;
        Ok(RenderedResult::text(turtle.to_string()))
    }
}

/// Graph result as the default graph of a TriG document. Triples are
/// re-serialized in full IRI form since directives cannot appear in a block.
pub struct TrigRenderer;

impl ResultRenderer for TrigRenderer {
    fn key(&self) -> &'static str {
        "trig"
    }

    fn label(&self) -> &'static str {
        "TriG"
    }

    fn priority(&self) -> i32 {
        3
    }

    fn can_handle(&self, outcome: &QueryOutcome) -> bool {
        outcome.is_graph()
    }

    fn render(&self, outcome: &QueryOutcome) -> WorkbenchResult<RenderedResult> {
        let turtle = outcome.turtle().ok_or_else(|| unsupported(self.key()))?;
        let mut text = String::from("{\n");
        for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(turtle.as_bytes()) {
            let quad = quad.map_err(|e| WorkbenchError::Parse(e.to_string()))?;
            let _ = writeln!(text, "    {} .", Triple::from(quad));
        }
        text.push_str("}\n");
        Ok(RenderedResult::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::Binding;

    fn solutions() -> QueryOutcome {
        QueryOutcome::Solutions {
            variables: vec!["server".into(), "label".into()],
            rows: vec![
                Binding::from([
                    ("server".to_string(), RdfTerm::Uri { value: "http://x/web01".into() }),
                    (
                        "label".to_string(),
                        RdfTerm::Literal {
                            value: "Web".into(),
                            datatype: None,
                            lang: Some("en".into()),
                        },
                    ),
                ]),
                Binding::from([("server".to_string(), RdfTerm::Bnode { value: "b0".into() })]),
            ],
        }
    }

    fn graph() -> QueryOutcome {
        QueryOutcome::Graph {
            turtle: "<http://x/a> <http://x/p> <http://x/b> .\n".into(),
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = RendererRegistry::with_builtins();
        let keys: Vec<&str> = registry.keys().collect();
        assert_eq!(keys, vec!["construct", "jsonld", "table", "trig", "turtle"]);
        assert_eq!(registry.get("construct").unwrap().label(), "Graph View");
    }

    #[test]
    fn test_best_renderer_by_priority() {
        let registry = RendererRegistry::with_builtins();
        assert_eq!(registry.best_for(&solutions()).unwrap().key(), "table");
        assert_eq!(registry.best_for(&graph()).unwrap().key(), "construct");
        assert_eq!(registry.best_for(&QueryOutcome::Boolean(true)).unwrap().key(), "table");
        assert!(RendererRegistry::new().best_for(&graph()).is_none());
    }

    struct Loud(&'static str, i32);

    impl ResultRenderer for Loud {
        fn key(&self) -> &'static str {
            self.0
        }
        fn label(&self) -> &'static str {
            "Loud"
        }
        fn priority(&self) -> i32 {
            self.1
        }
        fn can_handle(&self, _: &QueryOutcome) -> bool {
            true
        }
        fn render(&self, _: &QueryOutcome) -> WorkbenchResult<RenderedResult> {
            Ok(RenderedResult::text("LOUD".into()))
        }
    }

    #[test]
    fn test_custom_renderer_and_ties() {
        let mut registry = RendererRegistry::with_builtins();
        registry.register(Box::new(Loud("zz", 20)));
        assert_eq!(registry.best_for(&graph()).unwrap().key(), "construct");
        registry.register(Box::new(Loud("aa", 20)));
        assert_eq!(registry.best_for(&graph()).unwrap().key(), "aa");
        registry.register(Box::new(Loud("table", 1)));
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.get("table").unwrap().label(), "Loud");
    }

    #[test]
    fn test_render_with_errors() {
        let registry = RendererRegistry::with_builtins();
        assert!(matches!(
            registry.render_with("nope", &graph()),
            Err(WorkbenchError::UnknownRenderer(_))
        ));
        assert!(matches!(
            registry.render_with("table", &graph()),
            Err(WorkbenchError::UnsupportedResult { .. })
        ));
    }

    #[test]
    fn test_table_output() {
        let text = TableRenderer.render(&solutions()).unwrap().text;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "server         | label");
        assert!(lines[1].starts_with("---"));
        assert_eq!(lines[2], "http://x/web01 | Web@en");
        assert_eq!(lines[3], "_:b0");
        assert!(text.contains("2 results"));
        let typed = QueryOutcome::Solutions {
            variables: vec!["t".into()],
            rows: vec![Binding::from([(
                "t".to_string(),
                RdfTerm::Uri { value: "https://w3id.org/devops-infra/Application".into() },
            )])],
        };
        assert!(TableRenderer.render(&typed).unwrap().text.contains("devops:Application"));
        assert_eq!(TableRenderer.render(&QueryOutcome::Boolean(false)).unwrap().text, "false\n");
    }

    #[test]
    fn test_construct_preview_and_payload() {
        let rendered = ConstructRenderer.render(&graph()).unwrap();
        assert!(rendered.text.contains("Found 1 triples"));
        assert!(!rendered.text.contains("truncated"));
        assert_eq!(rendered.graph_payload.as_deref(), graph().turtle());

        let long: String = (0..40)
            .map(|i| format!("<http://x/n{i}> <http://x/p> <http://x/m{i}> .\n"))
            .collect();
        let rendered = ConstructRenderer
            .render(&QueryOutcome::Graph { turtle: long.clone() })
            .unwrap();
        assert!(rendered.text.contains("Found 40 triples"));
        assert!(rendered.text.contains("\n\n... (truncated)"));
        assert_eq!(rendered.graph_payload.unwrap(), long);
    }

    #[test]
    fn test_jsonld_output() {
        let text = JsonLdRenderer.render(&solutions()).unwrap().text;
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["@context"]["server"], "ex:server");
        assert_eq!(value["@graph"][0]["label"], "Web");
        assert_eq!(value["@graph"][1]["server"], "b0");
    }

    #[test]
    fn test_trig_wraps_default_graph() {
        let text = TrigRenderer.render(&graph()).unwrap().text;
        assert_eq!(text, "{\n    <http://x/a> <http://x/p> <http://x/b> .\n}\n");
        assert_eq!(TurtleRenderer.render(&graph()).unwrap().text, graph().turtle().unwrap());
    }

    #[test]
    fn test_trig_from_prefixed_turtle_is_valid() {
        let prefixed = QueryOutcome::Graph {
            turtle: "@prefix ex: <http://x/> .\nex:a ex:p ex:b ; ex:q \"lit\" .\n".into(),
        };
        let text = TrigRenderer.render(&prefixed).unwrap().text;
        assert!(!text.contains("@prefix"));

        let quads: Vec<_> = RdfParser::from_format(RdfFormat::TriG)
            .for_reader(text.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(quads.len(), 2);
        assert!(quads.iter().all(|q| q.graph_name.is_default_graph()));
        assert_eq!(quads[0].subject.to_string(), "<http://x/a>");
    }

    #[test]
    fn test_trig_rejects_broken_turtle() {
        let broken = QueryOutcome::Graph {
            turtle: "ex:a ex:p".into(),
        };
        assert!(matches!(
            TrigRenderer.render(&broken),
            Err(WorkbenchError::Parse(_))
        ));
    }
}
