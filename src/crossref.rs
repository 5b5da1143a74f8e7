//! CrossRef works API wire contract.
//!
//! The two halves of the fetch boundary the core owns: shaping a
//! [`StructuredQuery`] or DOI into a request URL, and consuming the JSON
//! `message` envelope the service answers with. The HTTP transport itself
//! lives behind [`MetadataFetcher`](crate::MetadataFetcher), outside this
//! crate.

use crate::parser::StructuredQuery;
use crate::record::RawRecord;
use crate::{Error, Result};
use serde::Deserialize;

/// Works endpoint of the CrossRef REST API.
pub const API_BASE: &str = "https://api.crossref.org/works";

/// Cap on the number of candidates requested per search.
pub const MAX_ROWS: usize = 15;

#[derive(Deserialize)]
struct WorkEnvelope {
    message: RawRecord,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    message: SearchMessage,
}

#[derive(Deserialize, Default)]
struct SearchMessage {
    #[serde(default)]
    items: Vec<RawRecord>,
}

/// URL resolving a single work by DOI.
#[must_use]
pub fn works_url(doi: &str) -> String {
    format!("{API_BASE}/{}", urlencoding::encode(doi))
}

/// Query parameters for a structured or free-text search.
///
/// Field mapping: extracted or fallback text goes to `query`, author
/// surnames to `query.author`, the journal to `query.container-title`, and
/// the year becomes a publication-date filter pair. `rows` caps the
/// candidate set at [`MAX_ROWS`].
#[must_use]
pub fn search_params(query: &StructuredQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let Some(text) = query.free_text() {
        params.push(("query", text.to_string()));
    }
    if !query.authors.is_empty() {
        params.push(("query.author", query.authors.join(" ")));
    }
    if let Some(journal) = query.journal.as_deref() {
        params.push(("query.container-title", journal.to_string()));
    }
    if let Some(year) = query.year {
        params.push((
            "filter",
            format!("from-pub-date:{year},until-pub-date:{year}"),
        ));
    }
    params.push(("rows", MAX_ROWS.to_string()));

    params
}

/// Full search URL for a structured query.
#[must_use]
pub fn search_url(query: &StructuredQuery) -> String {
    let encoded: Vec<String> = search_params(query)
        .into_iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
        .collect();
    format!("{API_BASE}?{}", encoded.join("&"))
}

/// Consumes a `/works/{doi}` response body.
pub fn parse_work(body: &str) -> Result<RawRecord> {
    let envelope: WorkEnvelope =
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))?;
    Ok(envelope.message)
}

/// Consumes a `/works?query=...` response body, returning the candidates in
/// service order. Zero items is a valid response, not an error.
pub fn parse_search_response(body: &str) -> Result<Vec<RawRecord>> {
    let envelope: SearchEnvelope =
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))?;
    Ok(envelope.message.items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_works_url_percent_encodes() {
        assert_eq!(
            works_url("10.1016/j.jmps.2004.03.006"),
            "https://api.crossref.org/works/10.1016%2Fj.jmps.2004.03.006"
        );
    }

    #[test]
    fn test_search_params_structured_query() {
        let query = StructuredQuery {
            authors: vec!["Ji".into(), "Gao".into()],
            year: Some(2004),
            journal: Some("Journal of the Mechanics and Physics of Solids".into()),
            title: Some("Mechanical properties of nanostructured biological materials".into()),
            ..Default::default()
        };
        let params = search_params(&query);
        assert_eq!(
            params,
            vec![
                (
                    "query",
                    "Mechanical properties of nanostructured biological materials".to_string()
                ),
                ("query.author", "Ji Gao".to_string()),
                (
                    "query.container-title",
                    "Journal of the Mechanics and Physics of Solids".to_string()
                ),
                ("filter", "from-pub-date:2004,until-pub-date:2004".to_string()),
                ("rows", "15".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_params_fallback_only() {
        let query = StructuredQuery {
            fallback_query: Some("kinetic theory of dislocation climb".into()),
            ..Default::default()
        };
        let params = search_params(&query);
        assert_eq!(
            params,
            vec![
                ("query", "kinetic theory of dislocation climb".to_string()),
                ("rows", "15".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_url_encodes_values() {
        let query = StructuredQuery {
            journal: Some("Physical Review Materials".into()),
            year: Some(2021),
            ..Default::default()
        };
        assert_eq!(
            search_url(&query),
            "https://api.crossref.org/works?query.container-title=Physical%20Review%20Materials&filter=from-pub-date%3A2021%2Cuntil-pub-date%3A2021&rows=15"
        );
    }

    #[test]
    fn test_parse_work() {
        let body = r#"{"status":"ok","message":{"title":["A Paper"],"DOI":"10.1000/x"}}"#;
        let record = parse_work(body).unwrap();
        assert_eq!(record.title(), Some("A Paper"));
        assert_eq!(record.doi.as_deref(), Some("10.1000/x"));
    }

    #[test]
    fn test_parse_search_response_empty_items() {
        let body = r#"{"status":"ok","message":{"items":[]}}"#;
        assert_eq!(parse_search_response(body).unwrap(), Vec::new());
    }

    #[test]
    fn test_parse_search_response_missing_items_defaults() {
        let body = r#"{"message":{}}"#;
        assert_eq!(parse_search_response(body).unwrap(), Vec::new());
    }

    #[test]
    fn test_parse_work_malformed() {
        let err = parse_work("{not json").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
