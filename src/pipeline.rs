//! The parse → fetch → rank resolution pipeline.
//!
//! [`Resolver`] wires the parser, a caller-supplied [`MetadataFetcher`], and
//! the ranker together. It never blocks on user interaction: an ambiguous
//! search comes back as [`MatchOutcome::NeedsSelection`], and the caller
//! resumes with [`select`] once a choice was made.

use crate::parser::ReferenceParser;
use crate::rank::{MatchOutcome, Ranker};
use crate::record::RawRecord;
use crate::utils::format_doi;
use crate::{Error, MetadataFetcher, Result};

/// Orchestrates one resolution from input text to a match outcome.
///
/// Holds no per-invocation state; a single resolver can serve any number of
/// sequential or concurrent lookups.
#[derive(Debug, Clone)]
pub struct Resolver<F> {
    parser: ReferenceParser,
    ranker: Ranker,
    fetcher: F,
}

impl<F: MetadataFetcher> Resolver<F> {
    /// Creates a resolver around a fetcher, with the default parser (built-in
    /// abbreviation table) and ranker.
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self {
            parser: ReferenceParser::default(),
            ranker: Ranker::new(),
            fetcher,
        }
    }

    /// Replaces the reference parser.
    #[must_use]
    pub fn with_parser(mut self, parser: ReferenceParser) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the ranker.
    #[must_use]
    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Resolves an identifier or free-text input.
    ///
    /// A whitespace-free input that cleans up into a DOI is fetched
    /// directly; anything else goes through the parse → search → rank
    /// pipeline.
    pub fn resolve(&self, input: &str) -> Result<MatchOutcome> {
        let trimmed = input.trim();
        if !trimmed.contains(char::is_whitespace) {
            if let Some(doi) = format_doi(trimmed) {
                tracing::debug!(%doi, "input recognized as DOI");
                return Ok(MatchOutcome::Resolved(self.fetcher.fetch_by_doi(&doi)?));
            }
        }
        self.resolve_text(input)
    }

    /// Resolves a DOI, cleaning it first.
    pub fn resolve_doi(&self, raw: &str) -> Result<RawRecord> {
        let doi = format_doi(raw).ok_or_else(|| Error::InvalidDoi(raw.to_string()))?;
        Ok(self.fetcher.fetch_by_doi(&doi)?)
    }

    /// Parses free text, searches, and ranks the candidates.
    ///
    /// Returns [`Error::EmptyQuery`] when the parse extracted nothing to
    /// search for; a search that finds nothing yields
    /// [`MatchOutcome::NoMatch`], which is not an error.
    pub fn resolve_text(&self, text: &str) -> Result<MatchOutcome> {
        let query = self.parser.parse(text);
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let candidates = self.fetcher.search(&query)?;
        tracing::debug!(candidates = candidates.len(), "search returned");
        Ok(self.ranker.decide(candidates, &query))
    }
}

/// Resumes a [`MatchOutcome::NeedsSelection`] hand-off with the index the
/// caller chose.
pub fn select(candidates: Vec<RawRecord>, index: usize) -> Result<RawRecord> {
    let len = candidates.len();
    candidates
        .into_iter()
        .nth(index)
        .ok_or(Error::SelectionOutOfRange { index, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DateParts, RecordAuthor};
    use crate::{AbbreviationTable, FetchError, StructuredQuery};
    use pretty_assertions::assert_eq;

    /// In-memory fetcher for pipeline tests.
    struct MockFetcher {
        records: Vec<RawRecord>,
        fail_with: Option<fn() -> FetchError>,
    }

    impl MockFetcher {
        fn returning(records: Vec<RawRecord>) -> Self {
            Self {
                records,
                fail_with: None,
            }
        }

        fn failing(fail_with: fn() -> FetchError) -> Self {
            Self {
                records: Vec::new(),
                fail_with: Some(fail_with),
            }
        }
    }

    impl MetadataFetcher for MockFetcher {
        fn fetch_by_doi(&self, doi: &str) -> std::result::Result<RawRecord, FetchError> {
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            self.records
                .iter()
                .find(|r| r.doi.as_deref() == Some(doi))
                .cloned()
                .ok_or_else(|| FetchError::NotFound(doi.to_string()))
        }

        fn search(
            &self,
            _query: &StructuredQuery,
        ) -> std::result::Result<Vec<RawRecord>, FetchError> {
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            Ok(self.records.clone())
        }
    }

    fn prm_record() -> RawRecord {
        RawRecord {
            title: vec!["Vacancy formation energies in refractory alloys".into()],
            container_title: vec!["Physical Review Materials".into()],
            author: vec![RecordAuthor {
                given: Some("Xin".into()),
                family: Some("Wang".into()),
                literal: None,
            }],
            published_print: Some(DateParts {
                date_parts: vec![vec![Some(2021), Some(8)]],
            }),
            volume: Some("5".into()),
            page: Some("083603".into()),
            doi: Some("10.1103/physrevmaterials.5.083603".into()),
            work_type: Some("journal-article".into()),
            ..Default::default()
        }
    }

    fn parser() -> ReferenceParser {
        ReferenceParser::new(AbbreviationTable::builtin()).with_max_year(2027)
    }

    #[test]
    fn test_end_to_end_single_candidate_auto_selects() {
        let resolver =
            Resolver::new(MockFetcher::returning(vec![prm_record()])).with_parser(parser());
        let outcome = resolver
            .resolve_text("PHYSICAL REVIEW MATERIALS 5, 083603 (2021)")
            .unwrap();
        let record = match outcome {
            MatchOutcome::Resolved(record) => record,
            other => panic!("expected auto-selection, got {other:?}"),
        };

        let bibtex = crate::to_bibtex(&record);
        assert!(bibtex.contains("journal = {Physical Review Materials}"));
        assert!(bibtex.contains("year = {2021}"));
    }

    #[test]
    fn test_no_candidates_is_no_match_not_error() {
        let resolver = Resolver::new(MockFetcher::returning(Vec::new())).with_parser(parser());
        let outcome = resolver
            .resolve_text("PHYSICAL REVIEW MATERIALS 5, 083603 (2021)")
            .unwrap();
        assert_eq!(outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn test_transport_failure_is_an_error() {
        let resolver =
            Resolver::new(MockFetcher::failing(|| {
                FetchError::Transport("connection reset".into())
            }))
            .with_parser(parser());
        let err = resolver
            .resolve_text("PHYSICAL REVIEW MATERIALS 5, 083603 (2021)")
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Transport(_))));
    }

    #[test]
    fn test_empty_input_is_rejected_before_fetching() {
        let resolver = Resolver::new(MockFetcher::returning(Vec::new())).with_parser(parser());
        assert!(matches!(
            resolver.resolve_text("   "),
            Err(Error::EmptyQuery)
        ));
    }

    #[test]
    fn test_resolve_detects_doi_input() {
        let resolver = Resolver::new(MockFetcher::returning(vec![prm_record()]));
        let outcome = resolver
            .resolve("https://doi.org/10.1103/PhysRevMaterials.5.083603")
            .unwrap();
        assert!(outcome.is_resolved());
    }

    #[test]
    fn test_resolve_doi_not_found() {
        let resolver = Resolver::new(MockFetcher::returning(Vec::new()));
        let err = resolver.resolve_doi("10.1000/absent").unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::NotFound(_))));
    }

    #[test]
    fn test_resolve_doi_invalid_input() {
        let resolver = Resolver::new(MockFetcher::returning(Vec::new()));
        assert!(matches!(
            resolver.resolve_doi("gibberish"),
            Err(Error::InvalidDoi(_))
        ));
    }

    #[test]
    fn test_selection_resumption() {
        let first = prm_record();
        let mut second = prm_record();
        second.title = vec!["A second candidate".into()];

        let chosen = select(vec![first, second.clone()], 1).unwrap();
        assert_eq!(chosen, second);
    }

    #[test]
    fn test_selection_out_of_range() {
        let err = select(vec![prm_record()], 3).unwrap_err();
        assert!(matches!(
            err,
            Error::SelectionOutOfRange { index: 3, len: 1 }
        ));
    }
}
