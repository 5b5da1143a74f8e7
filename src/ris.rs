//! RIS serialization.
//!
//! Emits the tagged two-letter-field format consumed by Zotero, Mendeley,
//! and EndNote. Total over any record shape; missing fields are omitted.

use crate::record::RawRecord;
use crate::utils::split_page_range;

/// Maps the service-reported work type to a RIS reference type.
fn ris_type(work_type: Option<&str>) -> &'static str {
    match work_type {
        Some("journal-article") => "JOUR",
        Some("proceedings-article") => "CPAPER",
        Some("book-chapter") => "CHAP",
        Some("book") | Some("edited-book") | Some("monograph") => "BOOK",
        Some("report") => "RPRT",
        Some("dissertation") => "THES",
        _ => "GEN",
    }
}

/// Serializes a record in RIS format.
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
/// let ris = bibmatch::to_ris(&record);
/// assert!(ris.starts_with("TY  - JOUR"));
/// assert!(ris.ends_with("ER  - \n"));
/// ```
#[must_use]
pub fn to_ris(record: &RawRecord) -> String {
    let mut lines = Vec::new();
    let mut tag = |tag: &str, value: &str| lines.push(format!("{tag}  - {value}"));

    tag("TY", ris_type(record.work_type.as_deref()));

    if let Some(title) = record.title() {
        tag("TI", title);
    }
    for author in &record.author {
        if let Some(name) = author.display_name() {
            tag("AU", &name);
        }
    }
    if let Some(year) = record.year() {
        tag("PY", &year.to_string());
    }
    if let Some(journal) = record.journal() {
        tag("JO", journal);
    }
    if let Some(volume) = &record.volume {
        tag("VL", volume);
    }
    if let Some(issue) = &record.issue {
        tag("IS", issue);
    }
    if let Some(pages) = &record.page {
        let (start, end) = split_page_range(pages);
        tag("SP", &start);
        if let Some(end) = end {
            tag("EP", &end);
        }
    }
    if let Some(doi) = &record.doi {
        tag("DO", doi);
    }
    if let Some(publisher) = &record.publisher {
        tag("PB", publisher);
    }
    if let Some(issn) = record.issn.first() {
        tag("SN", issn);
    }
    if let Some(url) = &record.url {
        tag("UR", url);
    }
    if let Some(abstract_text) = &record.abstract_text {
        tag("AB", abstract_text);
    }

    tag("ER", "");
    lines.join("\n") + "\n"
}
