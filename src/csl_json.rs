//! CSL-JSON serialization.
//!
//! Produces a Citation Style Language item as a `serde_json::Value`. Total
//! over any record shape; missing fields are omitted, and nothing is
//! LaTeX-escaped.

use crate::bibtex::cite_key;
use crate::record::RawRecord;
use serde_json::{Map, Value, json};

/// Maps the service-reported work type to a CSL item type.
fn csl_type(work_type: Option<&str>) -> &'static str {
    match work_type {
        Some("journal-article") => "article-journal",
        Some("proceedings-article") => "paper-conference",
        Some("book-chapter") => "chapter",
        Some("book") | Some("edited-book") | Some("monograph") => "book",
        Some("report") => "report",
        Some("dissertation") => "thesis",
        Some("dataset") => "dataset",
        _ => "article",
    }
}

/// Serializes a record as a CSL-JSON item.
///
/// # Examples
///
/// ```
/// use bibmatch::RawRecord;
///
/// let record = RawRecord {
///     title: vec!["An Example".into()],
///     work_type: Some("journal-article".into()),
///     ..Default::default()
/// };
/// let item = bibmatch::to_csl_json(&record);
/// assert_eq!(item["type"], "article-journal");
/// assert_eq!(item["title"], "An Example");
/// ```
#[must_use]
pub fn to_csl_json(record: &RawRecord) -> Value {
    let mut item = Map::new();
    item.insert("id".into(), json!(cite_key(record)));
    item.insert(
        "type".into(),
        json!(csl_type(record.work_type.as_deref())),
    );

    if let Some(title) = record.title() {
        item.insert("title".into(), json!(title));
    }
    if let Some(journal) = record.journal() {
        item.insert("container-title".into(), json!(journal));
    }

    if !record.author.is_empty() {
        let authors: Vec<Value> = record
            .author
            .iter()
            .map(|author| match (&author.family, &author.given) {
                (None, None) => json!({ "literal": author.literal }),
                (family, given) => {
                    let mut name = Map::new();
                    if let Some(family) = family {
                        name.insert("family".into(), json!(family));
                    }
                    if let Some(given) = given {
                        name.insert("given".into(), json!(given));
                    }
                    Value::Object(name)
                }
            })
            .collect();
        item.insert("author".into(), json!(authors));
    }

    if let Some(year) = record.year() {
        let parts: Vec<i64> = match record.month() {
            Some(month) => vec![i64::from(year), i64::from(month)],
            None => vec![i64::from(year)],
        };
        item.insert("issued".into(), json!({ "date-parts": [parts] }));
    }

    if let Some(volume) = &record.volume {
        item.insert("volume".into(), json!(volume));
    }
    if let Some(issue) = &record.issue {
        item.insert("issue".into(), json!(issue));
    }
    if let Some(page) = &record.page {
        item.insert("page".into(), json!(page));
    }
    if let Some(doi) = &record.doi {
        item.insert("DOI".into(), json!(doi));
    }
    if let Some(url) = &record.url {
        item.insert("URL".into(), json!(url));
    }
    if let Some(publisher) = &record.publisher {
        item.insert("publisher".into(), json!(publisher));
    }
    if !record.issn.is_empty() {
        item.insert("ISSN".into(), json!(record.issn));
    }
    if let Some(abstract_text) = &record.abstract_text {
        item.insert("abstract".into(), json!(abstract_text));
    }

    Value::Object(item)
}
