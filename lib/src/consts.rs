//! Defines constant NamedNodeRefs for the zbMATH element vocabulary, plus the
//! element names and defaults shared by the converter and the query runner.

use oxigraph::model::NamedNodeRef;

/// Namespace every document subject and field predicate is minted in.
pub const ZBMATH_NS: &str = "http://zbmath.org/zbmath/elements/1.0/zbmath:";

pub const TYPE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
pub const DOCUMENT: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://zbmath.org/zbmath/elements/1.0/zbmath:Document");

// repeated fields
pub const CLASSIFICATION: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://zbmath.org/zbmath/elements/1.0/zbmath:classification");
pub const AUTHOR_ID: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://zbmath.org/zbmath/elements/1.0/zbmath:author_id");
pub const KEYWORD: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://zbmath.org/zbmath/elements/1.0/zbmath:keyword");

// element local names in the source XML
pub const RECORD_ELEMENT: &str = "record";
pub const DOCUMENT_ID_ELEMENT: &str = "document_id";
pub const CLASSIFICATION_ELEMENT: &str = "classification";
pub const AUTHOR_ID_ELEMENT: &str = "author_id";
pub const KEYWORD_ELEMENT: &str = "keyword";

// zbMATH search URLs used in the solutions report
pub const KEYWORD_SEARCH_URL: &str = "https://zbmath.org/?q=ut%3A";
pub const PAPER_SEARCH_URL: &str = "https://zbmath.org/?q=an%3A";
pub const AUTHOR_SEARCH_URL: &str = "https://zbmath.org/authors/?q=ai%3A";

pub const SPARQL_RESULTS_XML: &str = "application/sparql-results+xml";

pub const DEFAULT_FLUSH_THRESHOLD: usize = 1_000_000;
pub const DEFAULT_SPLIT_MAX_SIZE_MB: u64 = 500;
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9999/bigdata/namespace/kb/sparql";
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
