//! Free-text reference parsing.
//!
//! Turns an unstructured citation fragment (arbitrary author/journal/year
//! ordering, abbreviations, line-break noise) into a [`StructuredQuery`]
//! ready for request shaping.
//!
//! The parse is a pipeline of pure extraction steps over the remaining
//! unconsumed text: whitespace normalization, year, authors, journal,
//! volume/page, title. Each step only consumes what it confidently
//! recognized; when nothing structural is found at all, the whole normalized
//! input becomes the fallback full-text query, so parsing never fails.
//!
//! # Example
//!
//! ```
//! use bibmatch::{AbbreviationTable, ReferenceParser};
//!
//! let parser = ReferenceParser::new(AbbreviationTable::builtin());
//!
//! let query = parser.parse("PHYSICAL REVIEW MATERIALS 5, 083603 (2021)");
//! assert_eq!(query.journal.as_deref(), Some("Physical Review Materials"));
//! assert_eq!(query.year, Some(2021));
//! assert_eq!(query.volume.as_deref(), Some("5"));
//! assert_eq!(query.page.as_deref(), Some("083603"));
//! ```

mod extract;
mod structure;

pub use structure::StructuredQuery;

use crate::abbrev::AbbreviationTable;
use crate::utils::{first_page, normalize_whitespace};
use chrono::Datelike;
use extract::MIN_YEAR;

/// Parser for free-text citation fragments.
///
/// Holds the abbreviation table it normalizes journal names against and the
/// upper bound of the plausible year range. Construction is cheap and the
/// parser is immutable afterwards, so one instance can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    table: AbbreviationTable,
    max_year: u16,
}

impl ReferenceParser {
    /// Creates a parser using the given abbreviation table.
    ///
    /// The plausible year range defaults to `1900 ..= current year + 1`; the
    /// upper bound admits in-press citations dated next year.
    #[must_use]
    pub fn new(table: AbbreviationTable) -> Self {
        Self {
            table,
            max_year: current_year().saturating_add(1),
        }
    }

    /// Overrides the upper bound of the plausible year range.
    ///
    /// Mainly useful for deterministic tests.
    #[must_use]
    pub fn with_max_year(mut self, max_year: u16) -> Self {
        self.max_year = max_year;
        self
    }

    /// Parses a free-text reference into a structured query.
    ///
    /// Never fails: fields that cannot be extracted with confidence are left
    /// empty, and if nothing structural was recognized the whole
    /// whitespace-normalized input is returned as `fallback_query`.
    #[must_use]
    pub fn parse(&self, text: &str) -> StructuredQuery {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return StructuredQuery::default();
        }

        let (year, rest) = extract::take_year(&normalized, MIN_YEAR, self.max_year);
        let (authors, rest) = extract::take_authors(&self.table, &rest);

        let locator = extract::find_locator(&rest);
        let journal = extract::find_journal(
            &self.table,
            &rest,
            locator.as_ref().map(|l| l.range.start),
        );

        let cut = match (&journal, &locator) {
            (Some(j), Some(l)) => Some(j.range.start.min(l.range.start)),
            (Some(j), None) => Some(j.range.start),
            (None, Some(l)) => Some(l.range.start),
            (None, None) => None,
        };

        // A quoted span is a confident title on its own. The residual-text
        // candidate only counts when something else anchored the parse;
        // otherwise the whole input belongs to the fallback query instead.
        let anchored = cut.is_some() || !authors.is_empty() || year.is_some();
        let title = extract::take_quoted_title(&rest).or_else(|| {
            if anchored {
                extract::residual_title(&rest, cut)
            } else {
                None
            }
        });

        let (volume, page) = match &locator {
            Some(l) => (Some(l.volume.clone()), Some(first_page(&l.pages))),
            None => (None, None),
        };

        let mut query = StructuredQuery {
            authors,
            year,
            journal: journal.map(|j| j.name),
            volume,
            page,
            title,
            fallback_query: None,
        };

        // Partial extraction is always preferred over total fallback; only a
        // completely unstructured input degrades to a full-text query.
        if query.authors.is_empty()
            && query.year.is_none()
            && query.journal.is_none()
            && query.title.is_none()
        {
            query = StructuredQuery {
                fallback_query: Some(normalized),
                ..Default::default()
            };
        }

        tracing::debug!(?query, "parsed reference");
        query
    }
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::new(AbbreviationTable::builtin())
    }
}

fn current_year() -> u16 {
    u16::try_from(chrono::Utc::now().year()).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> ReferenceParser {
        ReferenceParser::new(AbbreviationTable::builtin()).with_max_year(2027)
    }

    #[test]
    fn test_parse_compact_author_reference() {
        let query = parser().parse(
            "Ji B, Gao H (2004) Mechanical properties of nanostructured \
             biological materials. J Mech Phys Solids 52:1963-1990",
        );
        assert_eq!(query.authors, vec!["Ji", "Gao"]);
        assert_eq!(query.year, Some(2004));
        assert_eq!(
            query.journal.as_deref(),
            Some("Journal of the Mechanics and Physics of Solids")
        );
        assert_eq!(query.volume.as_deref(), Some("52"));
        assert_eq!(query.page.as_deref(), Some("1963"));
        assert_eq!(
            query.title.as_deref(),
            Some("Mechanical properties of nanostructured biological materials")
        );
        assert_eq!(query.fallback_query, None);
    }

    #[test]
    fn test_parse_initials_first_reference() {
        let query = parser().parse("G. Thomas and M. J. Whelan, Phil. Mag. 4, 511 (1959)");
        assert_eq!(query.authors, vec!["Thomas", "Whelan"]);
        assert_eq!(query.year, Some(1959));
        assert_eq!(query.journal.as_deref(), Some("Philosophical Magazine"));
        assert_eq!(query.volume.as_deref(), Some("4"));
        assert_eq!(query.page.as_deref(), Some("511"));
        assert_eq!(query.title, None);
    }

    #[test]
    fn test_parse_all_caps_journal_reference() {
        let query = parser().parse("PHYSICAL REVIEW MATERIALS 5, 083603 (2021)");
        assert_eq!(query.authors, Vec::<String>::new());
        assert_eq!(query.year, Some(2021));
        assert_eq!(query.journal.as_deref(), Some("Physical Review Materials"));
        assert_eq!(query.volume.as_deref(), Some("5"));
        assert_eq!(query.page.as_deref(), Some("083603"));
        assert_eq!(query.fallback_query, None);
    }

    #[test]
    fn test_parse_line_broken_abbreviation() {
        let query = parser().parse("Nat\nCommun 8, 15959 (2017)");
        assert_eq!(query.journal.as_deref(), Some("Nature Communications"));
        assert_eq!(query.year, Some(2017));
        assert_eq!(query.volume.as_deref(), Some("8"));
    }

    #[test]
    fn test_parse_unstructured_text_falls_back() {
        let text = "Kinetic Theory of Dislocation Climb. I. General Models for Edge and Screw";
        let query = parser().parse(text);
        assert!(query.authors.is_empty());
        assert_eq!(query.year, None);
        assert_eq!(query.journal, None);
        assert_eq!(query.fallback_query.as_deref(), Some(text));
    }

    #[test]
    fn test_parse_is_idempotent_under_normalization() {
        let text = "Ji B, Gao H (2004)\n Mechanical properties of nanostructured\nbiological materials.  J Mech Phys Solids 52:1963-1990";
        let normalized = crate::utils::normalize_whitespace(text);
        assert_eq!(parser().parse(text), parser().parse(&normalized));
    }

    #[test]
    fn test_parse_parenthesized_year_always_extracted() {
        for text in [
            "Some title (1959)",
            "(2021) PHYSICAL REVIEW MATERIALS 5, 083603",
            "Authors unknown, strange layout (1999) 4:55",
        ] {
            let query = parser().parse(text);
            let expected: u16 = match text {
                t if t.contains("1959") => 1959,
                t if t.contains("2021") => 2021,
                _ => 1999,
            };
            assert_eq!(query.year, Some(expected), "input: {text}");
        }
    }

    #[test]
    fn test_parse_year_out_of_range_not_extracted() {
        let query = parser().parse("Ancient text (1776) about something");
        assert_eq!(query.year, None);
    }

    #[test]
    fn test_parse_partial_extraction_preferred_over_fallback() {
        // Year extracts, everything else is mush: no fallback, no guesses.
        let query = parser().parse("zzz qqq (2015) xyz");
        assert_eq!(query.year, Some(2015));
        assert_eq!(query.journal, None);
        assert_eq!(query.fallback_query, None);
    }

    #[test]
    fn test_parse_empty_input() {
        let query = parser().parse("   \n  ");
        assert!(query.is_empty());
    }

    #[test]
    fn test_parse_with_fabricated_table() {
        let table = AbbreviationTable::from_pairs([("j exotic res", "Journal of Exotic Results")]);
        let parser = ReferenceParser::new(table).with_max_year(2027);
        let query = parser.parse("Doe, J., J Exotic Res 3:14-27 (2020)");
        assert_eq!(query.authors, vec!["Doe"]);
        assert_eq!(query.journal.as_deref(), Some("Journal of Exotic Results"));
        assert_eq!(query.volume.as_deref(), Some("3"));
        assert_eq!(query.page.as_deref(), Some("14"));
    }
}
