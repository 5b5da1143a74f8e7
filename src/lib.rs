//! A library for turning DOIs and free-text citation fragments into structured
//! bibliography records.
//!
//! `bibmatch` parses unstructured reference strings into structured queries,
//! shapes them into requests against a CrossRef-style metadata service, ranks
//! and disambiguates the candidates that come back, and serializes the chosen
//! record as BibTeX, RIS, or CSL-JSON.
//!
//! # Key Features
//!
//! - **Free-text reference parsing**: heuristic extraction of authors, year,
//!   journal, volume, page, and title from citation fragments in arbitrary
//!   order, with graceful fallback to a full-text query.
//! - **Journal abbreviation resolution**: word-boundary-correct,
//!   case-insensitive lookup against an injectable abbreviation table
//!   (`"Nat Commun"` resolves to `"Nature Communications"`, but `"Nat"` never
//!   matches inside `"nanostructure"`).
//! - **Candidate ranking and disambiguation**: deterministic scoring of
//!   search-service candidates against the originating query, with
//!   auto-acceptance of unambiguous matches and a non-blocking
//!   [`MatchOutcome::NeedsSelection`] hand-off otherwise.
//! - **Format conversion**: total, never-failing serialization of any record
//!   shape to BibTeX, RIS, and CSL-JSON.
//!
//! # Basic Usage
//!
//! ```rust
//! use bibmatch::{AbbreviationTable, ReferenceParser};
//!
//! let parser = ReferenceParser::new(AbbreviationTable::builtin());
//! let query = parser.parse(
//!     "Ji B, Gao H (2004) Mechanical properties of nanostructured \
//!      biological materials. J Mech Phys Solids 52:1963-1990",
//! );
//!
//! assert_eq!(query.authors, vec!["Ji", "Gao"]);
//! assert_eq!(query.year, Some(2004));
//! assert_eq!(query.volume.as_deref(), Some("52"));
//! ```
//!
//! # The fetch boundary
//!
//! The library never performs I/O. Transport belongs to the caller, behind the
//! [`MetadataFetcher`] trait; [`crossref`] provides the request-shaping and
//! response-consumption halves of the CrossRef wire contract so that a fetcher
//! implementation reduces to moving bytes:
//!
//! ```rust,no_run
//! use bibmatch::{FetchError, MetadataFetcher, RawRecord, StructuredQuery, crossref};
//!
//! struct HttpFetcher; // wraps whatever HTTP client the application uses
//!
//! impl MetadataFetcher for HttpFetcher {
//!     fn fetch_by_doi(&self, doi: &str) -> Result<RawRecord, FetchError> {
//!         let url = crossref::works_url(doi);
//!         let body: String = unimplemented!("GET {url}");
//!         crossref::parse_work(&body).map_err(|e| FetchError::Transport(e.to_string()))
//!     }
//!
//!     fn search(&self, query: &StructuredQuery) -> Result<Vec<RawRecord>, FetchError> {
//!         let url = crossref::search_url(query);
//!         let body: String = unimplemented!("GET {url}");
//!         crossref::parse_search_response(&body).map_err(|e| FetchError::Transport(e.to_string()))
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`Error`]. A search that succeeds with zero
//! results is *not* an error; it surfaces as [`MatchOutcome::NoMatch`],
//! distinct from [`FetchError::Transport`]. Ambiguous parses are not errors
//! either; the parser degrades to a full-text fallback query instead.
//!
//! # Thread Safety
//!
//! The parser, abbreviation table, and ranker hold no mutable state after
//! construction and are safe to share across threads.

use thiserror::Error;

pub mod abbrev;
pub mod bibtex;
pub mod crossref;
pub mod csl_json;
pub mod parser;
pub mod pipeline;
pub mod rank;
pub mod record;
pub mod ris;
mod regex;
mod utils;

// Reexports
pub use abbrev::AbbreviationTable;
pub use bibtex::to_bibtex;
pub use csl_json::to_csl_json;
pub use parser::{ReferenceParser, StructuredQuery};
pub use pipeline::Resolver;
pub use rank::{MatchOutcome, Ranker, RankerConfig};
pub use record::{RawRecord, RecordAuthor};
pub use ris::to_ris;
pub use utils::format_doi;

/// A specialized Result type for bibmatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the resolution pipeline.
///
/// Control-flow outcomes that are *not* failures (zero candidates, multiple
/// candidates awaiting a user choice) are modeled on [`MatchOutcome`], not
/// here.
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata service could not be reached or rejected the request.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The service responded, but the payload did not deserialize as a
    /// CrossRef-style message envelope.
    #[error("malformed service response: {0}")]
    MalformedResponse(String),

    /// The input contained nothing to search for.
    #[error("empty query: no searchable field could be extracted")]
    EmptyQuery,

    /// A disambiguation index pointed past the end of the candidate set.
    #[error("selection index {index} out of range for {len} candidates")]
    SelectionOutOfRange { index: usize, len: usize },

    /// The supplied identifier is not a recognizable DOI.
    #[error("not a valid DOI: {0}")]
    InvalidDoi(String),
}

/// Failure modes of the external metadata fetcher.
///
/// `NotFound` and `Transport` are deliberately distinct: the former is a
/// definitive answer from the service, the latter says nothing about whether
/// the record exists. Retry policy, if any, belongs to the fetcher
/// implementation, never to the core.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The identifier or query resolved to no record at all.
    #[error("no record found for {0}")]
    NotFound(String),

    /// Network or service failure; the query may have been valid.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// The boundary to the external bibliographic search service.
///
/// Implementations own transport, timeouts, and cancellation. The core only
/// ever sees a record list or an explicit failure, and treats an empty list
/// as a successful "no match", never as an error.
pub trait MetadataFetcher {
    /// Resolve a single record by its (already cleaned) DOI.
    fn fetch_by_doi(&self, doi: &str) -> std::result::Result<RawRecord, FetchError>;

    /// Run a structured or free-text search, returning zero or more
    /// candidates in service order.
    fn search(&self, query: &StructuredQuery)
    -> std::result::Result<Vec<RawRecord>, FetchError>;
}
