//! SPARQL templates, one per problem kind.

use crate::consts::ZBMATH_NS;
use crate::problem::{Problem, ProblemKind};

/// Query text used for problems of a kind this tool does not know. Never sent.
pub const UNKNOWN_PROBLEM_QUERY: &str = "Unknown problem type";

/// Escapes a value for use inside a double-quoted SPARQL string literal.
fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn prefix() -> String {
    format!("PREFIX ns1: <{ZBMATH_NS}>\n")
}

pub fn keywords_query(author_id: &str) -> String {
    format!(
        "{}SELECT DISTINCT ?keyword\nWHERE {{\n    ?document ns1:author_id \"{}\" .\n    ?document ns1:keyword ?keyword .\n}}\n",
        prefix(),
        escape_literal(author_id)
    )
}

pub fn classification_intersection_query(classifications: &[String]) -> String {
    let mut patterns = String::new();
    let mut filters = Vec::with_capacity(classifications.len());
    for (i, code) in classifications.iter().enumerate() {
        let var = format!("?class{}", i + 1);
        patterns.push_str(&format!("    ?document ns1:classification {var} .\n"));
        filters.push(format!("STRSTARTS(STR({var}), \"{}\")", escape_literal(code)));
    }
    format!(
        "{}SELECT DISTINCT ?document\nWHERE {{\n{patterns}    FILTER ({})\n}}\nORDER BY ?document\n",
        prefix(),
        filters.join(" && ")
    )
}

pub fn top_authors_query(keyword: &str, before_year: &str, after_year: &str) -> String {
    format!(
        "{}SELECT DISTINCT ?author_id (COUNT(DISTINCT ?document) AS ?count)\n\
         WHERE {{\n\
         \x20   ?document ns1:keyword \"{}\" .\n\
         \x20   ?document ns1:author_id ?author_id .\n\
         \x20   ?document ns1:publication_year ?publication_year .\n\
         \x20   FILTER(?publication_year > \"{}\" && ?publication_year < \"{}\")\n\
         }}\n\
         GROUP BY ?author_id\n\
         ORDER BY DESC(?count)\n\
         LIMIT 10\n",
        prefix(),
        escape_literal(keyword),
        escape_literal(after_year),
        escape_literal(before_year)
    )
}

/// The query for `problem`, or `None` for unknown problem kinds.
pub fn query_for(problem: &Problem) -> Option<String> {
    match &problem.kind {
        ProblemKind::Keywords { author_id } => Some(keywords_query(author_id)),
        ProblemKind::ClassificationIntersection { classifications } => {
            Some(classification_intersection_query(classifications))
        }
        ProblemKind::TopAuthors {
            keyword,
            before_year,
            after_year,
        } => Some(top_authors_query(keyword, before_year, after_year)),
        ProblemKind::Unknown { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::sparql::SparqlEvaluator;

    fn assert_parses(query: &str) {
        SparqlEvaluator::new()
            .parse_query(query)
            .unwrap_or_else(|e| panic!("query does not parse: {e}\n{query}"));
    }

    #[test]
    fn test_keywords_query() {
        let q = keywords_query("hilbert.david");
        assert!(q.contains("?document ns1:author_id \"hilbert.david\" ."));
        assert!(q.contains("SELECT DISTINCT ?keyword"));
        assert_parses(&q);
    }

    #[test]
    fn test_intersection_query() {
        let q = classification_intersection_query(&["05C".to_string(), "68R".to_string()]);
        assert!(q.contains("?document ns1:classification ?class1 ."));
        assert!(q.contains("?document ns1:classification ?class2 ."));
        assert!(q.contains(
            "FILTER (STRSTARTS(STR(?class1), \"05C\") && STRSTARTS(STR(?class2), \"68R\"))"
        ));
        assert!(q.contains("ORDER BY ?document"));
        assert_parses(&q);
    }

    #[test]
    fn test_top_authors_query() {
        let q = top_authors_query("graph theory", "2010", "2000");
        assert!(q.contains("?document ns1:keyword \"graph theory\" ."));
        assert!(q.contains("FILTER(?publication_year > \"2000\" && ?publication_year < \"2010\")"));
        assert!(q.contains("LIMIT 10"));
        assert_parses(&q);
    }

    #[test]
    fn test_injected_quotes_are_escaped() {
        let q = keywords_query("a\" . ?x ?y ?z . #");
        assert!(q.contains(r#""a\" . ?x ?y ?z . #""#));
        assert_parses(&q);
    }

    #[test]
    fn test_unknown_has_no_query() {
        let problem = Problem {
            id: "u".into(),
            kind: ProblemKind::Unknown { kind: "x".into() },
        };
        assert!(query_for(&problem).is_none());
    }
}
