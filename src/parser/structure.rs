//! The structured query produced by the reference parser.

use serde::{Deserialize, Serialize};

/// A free-text reference decomposed into typed bibliographic fields.
///
/// Produced by [`ReferenceParser::parse`](crate::ReferenceParser::parse);
/// consumed by request shaping and the ranker. Fields the parser could not
/// extract with confidence stay empty; they are never guessed. When nothing
/// structural was recognized at all, `fallback_query` carries the normalized
/// input so the search can still proceed as a full-text query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    /// Author family names, in citation order. May be empty.
    pub authors: Vec<String>,
    /// Four-digit publication year, range-checked at extraction time.
    pub year: Option<u16>,
    /// Journal name, canonicalized through the abbreviation table when the
    /// table recognized it.
    pub journal: Option<String>,
    /// Volume, kept as a string (services report non-numeric volumes).
    pub volume: Option<String>,
    /// First page of the cited range, or an article number.
    pub page: Option<String>,
    /// Title candidate, possibly partial.
    pub title: Option<String>,
    /// Whitespace-normalized full input, populated only when none of the
    /// structured fields above could be extracted.
    pub fallback_query: Option<String>,
}

impl StructuredQuery {
    /// `true` when no searchable field is populated.
    ///
    /// Volume and page alone cannot anchor a search, so they do not count as
    /// searchable here.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.year.is_none()
            && self.journal.is_none()
            && self.title.is_none()
            && self.fallback_query.as_deref().is_none_or(str::is_empty)
    }

    /// `true` when at least one field beyond the fallback was extracted.
    #[must_use]
    pub fn has_structure(&self) -> bool {
        !self.authors.is_empty()
            || self.year.is_some()
            || self.journal.is_some()
            || self.volume.is_some()
            || self.page.is_some()
            || self.title.is_some()
    }

    /// The text the search service should match against: the title when one
    /// was extracted, otherwise the full-text fallback.
    #[must_use]
    pub fn free_text(&self) -> Option<&str> {
        self.title.as_deref().or(self.fallback_query.as_deref())
    }
}
