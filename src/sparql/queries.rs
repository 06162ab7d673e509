/// A named query offered as a starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleQuery {
    pub name: &'static str,
    pub query: &'static str,
}

pub const SAMPLE_QUERIES: &[SampleQuery] = &[
    SampleQuery {
        name: "Servers & VMs",
        query: r#"PREFIX devops: <https://w3id.org/devops-infra/>
PREFIX ex: <https://example.org/devops/>
PREFIX dct: <http://purl.org/dc/terms/>

SELECT ?server ?type ?identifier WHERE {
  ?server a ?type .
  ?server dct:identifier ?identifier .
  FILTER(CONTAINS(STR(?type), "Server"))
}"#,
    },
    SampleQuery {
        name: "Applications",
        query: r#"PREFIX devops: <https://w3id.org/devops-infra/>
PREFIX ex: <https://example.org/devops/>
PREFIX dct: <http://purl.org/dc/terms/>

SELECT ?app ?identifier ?version WHERE {
  ?app a devops:Application .
  ?app dct:identifier ?identifier .
  OPTIONAL { ?app devops:hasVersion ?version }
}"#,
    },
    SampleQuery {
        name: "Dependencies",
        query: r#"PREFIX devops: <https://w3id.org/devops-infra/>
PREFIX ex: <https://example.org/devops/>
PREFIX dct: <http://purl.org/dc/terms/>

SELECT ?source ?target ?relation WHERE {
  ?source ?relation ?target .
  FILTER(?relation IN (devops:dependsOn, devops:deployedOn, devops:hostedOn))
}"#,
    },
];

pub const DEFAULT_QUERY: &str = r#"PREFIX dct: <http://purl.org/dc/terms/>
PREFIX devops: <https://w3id.org/devops-infra/>
PREFIX ex: <https://example.org/devops/>

SELECT ?subject ?type ?identifier WHERE {
  ?subject a ?type .
  OPTIONAL { ?subject dct:identifier ?identifier }
}
LIMIT 20"#;

/// Prefixes used to compact IRIs in tabular output.
pub const COMMON_PREFIXES: &[(&str, &str)] = &[
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dct", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("devops", "https://w3id.org/devops-infra/"),
    ("ex", "https://example.org/devops/"),
];

/// Case-insensitive lookup by sample name.
pub fn find_sample(name: &str) -> Option<&'static SampleQuery> {
    SAMPLE_QUERIES
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

/// `prefix:local` for IRIs under a known namespace, the IRI otherwise.
pub fn compact_iri(iri: &str) -> String {
    COMMON_PREFIXES
        .iter()
        .find_map(|(prefix, ns)| {
            iri.strip_prefix(ns)
                .filter(|local| !local.is_empty() && !local.contains(['/', '#']))
                .map(|local| format!("{prefix}:{local}"))
        })
        .unwrap_or_else(|| iri.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::QueryForm;

    #[test]
    fn test_samples_are_select_queries() {
        assert_eq!(SAMPLE_QUERIES.len(), 3);
        for sample in SAMPLE_QUERIES {
            assert_eq!(QueryForm::detect(sample.query), QueryForm::Select, "{}", sample.name);
        }
        assert_eq!(QueryForm::detect(DEFAULT_QUERY), QueryForm::Select);
        assert!(DEFAULT_QUERY.ends_with("LIMIT 20"));
    }

    #[test]
    fn test_find_sample() {
        assert_eq!(find_sample("applications").unwrap().name, "Applications");
        assert_eq!(find_sample(" Servers & VMs ").unwrap().name, "Servers & VMs");
        assert!(find_sample("nothing").is_none());
    }

    #[test]
    fn test_compact_iri() {
        assert_eq!(compact_iri("http://purl.org/dc/terms/identifier"), "dct:identifier");
        assert_eq!(compact_iri("https://w3id.org/devops-infra/Application"), "devops:Application");
        assert_eq!(compact_iri("http://other.org/x"), "http://other.org/x");
        assert_eq!(compact_iri("https://example.org/devops/a/b"), "https://example.org/devops/a/b");
    }
}
