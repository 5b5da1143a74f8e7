//! Raw bibliographic metadata records.
//!
//! [`RawRecord`] mirrors the work-record shape returned by CrossRef-style
//! search services. Records are immutable once deserialized; everything the
//! ranker and the format converters need is exposed through accessors that
//! tolerate any combination of missing fields.

use serde::{Deserialize, Serialize};

/// One author of a record, as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordAuthor {
    /// Given name(s), e.g. `"Huajian"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
    /// Family name, e.g. `"Gao"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Single-field name for institutional authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

impl RecordAuthor {
    /// `"Family, Given"` rendering, degrading to whichever part exists.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (self.family.as_deref(), self.given.as_deref()) {
            (Some(family), Some(given)) => Some(format!("{family}, {given}")),
            (Some(family), None) => Some(family.to_string()),
            (None, Some(given)) => Some(given.to_string()),
            (None, None) => self.literal.clone(),
        }
    }
}

/// A date expressed as nested `date-parts`, CrossRef style:
/// `[[year, month, day]]` with trailing parts optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateParts {
    #[serde(default, rename = "date-parts")]
    pub date_parts: Vec<Vec<Option<i64>>>,
}

impl DateParts {
    fn part(&self, index: usize) -> Option<i64> {
        self.date_parts.first()?.get(index).copied().flatten()
    }
}

/// An opaque bibliographic record as returned by the metadata service.
///
/// Field names follow the CrossRef works schema; every field is optional and
/// defaults to empty, so any service payload that is structurally a work
/// record deserializes without error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(default, rename = "container-title", skip_serializing_if = "Vec::is_empty")]
    pub container_title: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<RecordAuthor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub editor: Vec<RecordAuthor>,
    #[serde(default, rename = "published-print", skip_serializing_if = "Option::is_none")]
    pub published_print: Option<DateParts>,
    #[serde(default, rename = "published-online", skip_serializing_if = "Option::is_none")]
    pub published_online: Option<DateParts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<DateParts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateParts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, rename = "DOI", skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(default, rename = "ISSN", skip_serializing_if = "Vec::is_empty")]
    pub issn: Vec<String>,
    #[serde(default, rename = "ISBN", skip_serializing_if = "Vec::is_empty")]
    pub isbn: Vec<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

impl RawRecord {
    /// Primary title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.first().map(String::as_str)
    }

    /// Journal or container title, if any.
    #[must_use]
    pub fn journal(&self) -> Option<&str> {
        self.container_title.first().map(String::as_str)
    }

    /// Publication year, taking the first populated date field in the order
    /// print, online, issued, created.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.dates().find_map(|d| d.part(0)).map(|y| y as i32)
    }

    /// Publication month (1–12), from the same date field ordering as
    /// [`RawRecord::year`].
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        self.dates()
            .find_map(|d| d.part(1))
            .filter(|m| (1..=12).contains(m))
            .map(|m| m as u32)
    }

    fn dates(&self) -> impl Iterator<Item = &DateParts> {
        [
            self.published_print.as_ref(),
            self.published_online.as_ref(),
            self.issued.as_ref(),
            self.created.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Family name of the first author, if any.
    #[must_use]
    pub fn first_author_family(&self) -> Option<&str> {
        self.author.first().and_then(|a| a.family.as_deref())
    }

    /// Compact one-line rendering for candidate lists: up to two authors,
    /// year, truncated quoted title, journal.
    #[must_use]
    pub fn short_summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.author.is_empty() {
            let mut names: Vec<String> = self
                .author
                .iter()
                .take(2)
                .filter_map(|a| {
                    a.family.as_deref().map(|family| match a.given.as_deref() {
                        Some(given) => match given.chars().next() {
                            Some(initial) => format!("{initial}. {family}"),
                            None => family.to_string(),
                        },
                        None => family.to_string(),
                    })
                })
                .collect();
            if self.author.len() > 2 {
                names.push("et al.".to_string());
            }
            if !names.is_empty() {
                parts.push(names.join(", "));
            }
        }

        if let Some(year) = self.year() {
            parts.push(format!("({year})"));
        }

        if let Some(title) = self.title() {
            parts.push(format!("\"{}\"", truncate(title, 60)));
        }

        if let Some(journal) = self.journal() {
            parts.push(journal.to_string());
        }

        parts.join(" ")
    }

    /// Detailed one-line rendering: up to three full author names, year,
    /// title, journal, volume and page.
    #[must_use]
    pub fn long_summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.author.is_empty() {
            let mut names: Vec<String> = self
                .author
                .iter()
                .take(3)
                .filter_map(|a| {
                    a.family.as_deref().map(|family| match a.given.as_deref() {
                        Some(given) => format!("{given} {family}"),
                        None => family.to_string(),
                    })
                })
                .collect();
            if self.author.len() > 3 {
                names.push("et al.".to_string());
            }
            if !names.is_empty() {
                parts.push(names.join(", "));
            }
        }

        if let Some(year) = self.year() {
            parts.push(format!("({year})"));
        }
        if let Some(title) = self.title() {
            parts.push(format!("\"{}\"", truncate(title, 80)));
        }
        if let Some(journal) = self.journal() {
            parts.push(journal.to_string());
        }

        let mut locator = Vec::new();
        if let Some(volume) = &self.volume {
            locator.push(format!("vol. {volume}"));
        }
        if let Some(page) = &self.page {
            locator.push(format!("p. {page}"));
        }
        if !locator.is_empty() {
            parts.push(locator.join(", "));
        }

        parts.join(" ")
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
