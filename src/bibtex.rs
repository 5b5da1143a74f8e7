//! BibTeX serialization.
//!
//! [`to_bibtex`] is total over any [`RawRecord`] shape: missing fields are
//! omitted, never fabricated, and the function cannot fail. Text fields are
//! LaTeX-escaped; identifiers and numbers pass through untouched.

use crate::record::RawRecord;
use itertools::Itertools;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Maps the service-reported work type to a BibTeX entry type.
///
/// Unrecognized or missing tags become `misc`.
fn entry_type(work_type: Option<&str>) -> &'static str {
    match work_type {
        Some("journal-article") => "article",
        Some("proceedings-article") => "inproceedings",
        Some("book-chapter") => "incollection",
        Some("book") | Some("edited-book") | Some("monograph") => "book",
        Some("report") => "techreport",
        Some("dissertation") => "phdthesis",
        _ => "misc",
    }
}

/// Citation key: lower-cased alphabetic first-author surname plus year, with
/// `anon`/`nd` placeholders when either is missing.
pub(crate) fn cite_key(record: &RawRecord) -> String {
    let author_part: String = record
        .first_author_family()
        .map(|family| {
            family
                .to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect()
        })
        .filter(|part: &String| !part.is_empty())
        .unwrap_or_else(|| "anon".to_string());

    let year_part = record
        .year()
        .map_or_else(|| "nd".to_string(), |year| year.to_string());

    format!("{author_part}{year_part}")
}

/// Escapes LaTeX special characters in a text field.
fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str(r"\&"),
            '%' => escaped.push_str(r"\%"),
            '$' => escaped.push_str(r"\$"),
            '#' => escaped.push_str(r"\#"),
            '_' => escaped.push_str(r"\_"),
            '{' => escaped.push_str(r"\{"),
            '}' => escaped.push_str(r"\}"),
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_names(authors: &[crate::record::RecordAuthor]) -> Option<String> {
    let joined = authors
        .iter()
        .filter_map(|author| author.display_name())
        .join(" and ");
    if joined.is_empty() { None } else { Some(joined) }
}

/// Serializes a record as a BibTeX entry.
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
/// let entry = bibmatch::to_bibtex(&record);
/// assert!(entry.starts_with("@article{anonnd,"));
/// ```
#[must_use]
pub fn to_bibtex(record: &RawRecord) -> String {
    let entry = entry_type(record.work_type.as_deref());
    let mut fields: Vec<(&str, String)> = Vec::new();

    if let Some(names) = format_names(&record.author) {
        fields.push(("author", format!("{{{}}}", escape_latex(&names))));
    }
    if let Some(title) = record.title() {
        fields.push(("title", format!("{{{}}}", escape_latex(title))));
    }
    if let Some(container) = record.journal() {
        match entry {
            "article" => fields.push(("journal", format!("{{{}}}", escape_latex(container)))),
            "inproceedings" | "incollection" => {
                fields.push(("booktitle", format!("{{{}}}", escape_latex(container))));
            }
            _ => {}
        }
    }
    if let Some(year) = record.year() {
        fields.push(("year", format!("{{{year}}}")));
    }
    if let Some(month) = record.month() {
        fields.push(("month", MONTHS[month as usize - 1].to_string()));
    }
    if let Some(volume) = &record.volume {
        fields.push(("volume", format!("{{{volume}}}")));
    }
    if let Some(issue) = &record.issue {
        fields.push(("number", format!("{{{issue}}}")));
    }
    if let Some(pages) = &record.page {
        let pages = pages.replace('\u{2013}', "-").replace('-', "--");
        fields.push(("pages", format!("{{{pages}}}")));
    }
    if let Some(publisher) = &record.publisher {
        fields.push(("publisher", format!("{{{}}}", escape_latex(publisher))));
    }
    if let Some(editors) = format_names(&record.editor) {
        fields.push(("editor", format!("{{{}}}", escape_latex(&editors))));
    }
    if let Some(doi) = &record.doi {
        fields.push(("doi", format!("{{{doi}}}")));
    }
    if let Some(url) = &record.url {
        fields.push(("url", format!("{{{url}}}")));
    }
    if let Some(issn) = record.issn.first() {
        fields.push(("issn", format!("{{{issn}}}")));
    }
    if let Some(isbn) = record.isbn.first() {
        fields.push(("isbn", format!("{{{isbn}}}")));
    }
    if let Some(abstract_text) = &record.abstract_text {
        fields.push(("abstract", format!("{{{}}}", escape_latex(abstract_text))));
    }

    let mut output = format!("@{entry}{{{key},\n", key = cite_key(record));
    let last = fields.len().saturating_sub(1);
    for (i, (name, value)) in fields.iter().enumerate() {
        let comma = if i < last { "," } else { "" };
        output.push_str(&format!("  {name} = {value}{comma}\n"));
    }
    output.push('}');
    output
}
