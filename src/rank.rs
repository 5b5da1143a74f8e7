//! Candidate ranking and disambiguation.
//!
//! Orders the records a search returned by how well they fit the originating
//! query, then decides whether the best one can be accepted without asking:
//! a single candidate always can, and a uniquely dominant candidate whose
//! title clears a high-confidence similarity threshold can too. Everything
//! else is surfaced as [`MatchOutcome::NeedsSelection`] for the caller to
//! resolve; the core never blocks on that choice.
//!
//! Scoring accumulates points for year match, normalized journal equality,
//! order-independent surname overlap, and title token overlap. The sort is
//! stable, so candidates the scoring cannot separate keep the search
//! service's original relative order, so ranking the same input twice always
//! produces the same output.

use crate::parser::StructuredQuery;
use crate::record::RawRecord;
use crate::utils::normalize_for_compare;
use std::collections::HashSet;
use strsim::jaro_winkler;

const YEAR_EXACT_POINTS: f64 = 2.0;
const YEAR_ADJACENT_POINTS: f64 = 1.0;
const JOURNAL_POINTS: f64 = 2.0;
const AUTHOR_OVERLAP_POINTS: f64 = 3.0;
const TITLE_OVERLAP_POINTS: f64 = 3.0;

/// Configuration of the disambiguation decision.
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Jaro-Winkler similarity between the query title and the top
    /// candidate's title above which a uniquely dominant candidate is
    /// auto-accepted.
    pub auto_accept_similarity: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            auto_accept_similarity: 0.93,
        }
    }
}

/// Outcome of ranking a candidate set against a query.
///
/// `NeedsSelection` is control flow, not an error: the surrounding layer
/// prompts, picks an index, and resumes via
/// [`pipeline::select`](crate::pipeline::select).
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// One candidate was unambiguously the right one.
    Resolved(RawRecord),
    /// Several plausible candidates, ranked best-first; an external choice
    /// is required before the pipeline can complete.
    NeedsSelection(Vec<RawRecord>),
    /// The search succeeded but matched nothing. Distinct from a fetch
    /// failure.
    NoMatch,
}

impl MatchOutcome {
    /// `true` when a record was auto-selected.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, MatchOutcome::Resolved(_))
    }
}

/// Deterministic candidate ranker.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    config: RankerConfig,
}

impl Ranker {
    /// Creates a ranker with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ranker with a custom configuration.
    #[must_use]
    pub fn with_config(mut self, config: RankerConfig) -> Self {
        self.config = config;
        self
    }

    /// Reorders the candidates best-first.
    ///
    /// The same elements come back; ties keep the service's original
    /// relative order.
    #[must_use]
    pub fn rank(&self, candidates: Vec<RawRecord>, query: &StructuredQuery) -> Vec<RawRecord> {
        self.scored(candidates, query)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    /// Ranks the candidates and decides whether the top one can be accepted
    /// without external disambiguation.
    #[must_use]
    pub fn decide(&self, candidates: Vec<RawRecord>, query: &StructuredQuery) -> MatchOutcome {
        let mut candidates = candidates;
        match candidates.len() {
            0 => return MatchOutcome::NoMatch,
            1 => return MatchOutcome::Resolved(candidates.remove(0)),
            _ => {}
        }

        let scored = self.scored(candidates, query);
        let dominant = scored[0].0 > scored[1].0;
        let similarity = query
            .free_text()
            .zip(scored[0].1.title())
            .map(|(query_title, candidate_title)| {
                jaro_winkler(
                    &normalize_for_compare(query_title),
                    &normalize_for_compare(candidate_title),
                )
            })
            .unwrap_or(0.0);

        tracing::debug!(
            top_score = scored[0].0,
            runner_up_score = scored[1].0,
            similarity,
            "ranked candidates"
        );

        let mut ranked: Vec<RawRecord> = scored.into_iter().map(|(_, record)| record).collect();
        if dominant && similarity >= self.config.auto_accept_similarity {
            MatchOutcome::Resolved(ranked.remove(0))
        } else {
            MatchOutcome::NeedsSelection(ranked)
        }
    }

    fn scored(
        &self,
        candidates: Vec<RawRecord>,
        query: &StructuredQuery,
    ) -> Vec<(f64, RawRecord)> {
        let mut scored: Vec<(f64, RawRecord)> = candidates
            .into_iter()
            .map(|record| (score(query, &record), record))
            .collect();
        // Stable: equal scores preserve service order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
    }
}

fn score(query: &StructuredQuery, record: &RawRecord) -> f64 {
    let mut points = 0.0;

    if let (Some(query_year), Some(record_year)) = (query.year, record.year()) {
        let diff = (i32::from(query_year) - record_year).abs();
        if diff == 0 {
            points += YEAR_EXACT_POINTS;
        } else if diff == 1 {
            points += YEAR_ADJACENT_POINTS;
        }
    }

    if let (Some(query_journal), Some(record_journal)) =
        (query.journal.as_deref(), record.journal())
    {
        if normalize_for_compare(query_journal) == normalize_for_compare(record_journal) {
            points += JOURNAL_POINTS;
        }
    }

    if !query.authors.is_empty() {
        let record_surnames: HashSet<String> = record
            .author
            .iter()
            .filter_map(|a| a.family.as_deref())
            .map(normalize_for_compare)
            .collect();
        let hits = query
            .authors
            .iter()
            .filter(|surname| record_surnames.contains(&normalize_for_compare(surname)))
            .count();
        points += AUTHOR_OVERLAP_POINTS * hits as f64 / query.authors.len() as f64;
    }

    if let (Some(query_text), Some(record_title)) = (query.free_text(), record.title()) {
        let query_tokens = title_tokens(query_text);
        if !query_tokens.is_empty() {
            let record_tokens = title_tokens(record_title);
            let overlap = query_tokens.intersection(&record_tokens).count();
            points += TITLE_OVERLAP_POINTS * overlap as f64 / query_tokens.len() as f64;
        }
    }

    points
}

/// Comparison tokens of a title: lower-cased alphanumeric words of three or
/// more characters.
fn title_tokens(title: &str) -> HashSet<String> {
    title
        .split_whitespace()
        .map(normalize_for_compare)
        .filter(|token| token.len() >= 3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordAuthor;

    fn record(title: &str, journal: &str, year: i64, families: &[&str]) -> RawRecord {
        RawRecord {
            title: vec![title.to_string()],
            container_title: vec![journal.to_string()],
            author: families
                .iter()
                .map(|family| RecordAuthor {
                    family: Some((*family).to_string()),
                    ..Default::default()
                })
                .collect(),
            issued: Some(crate::record::DateParts {
                date_parts: vec![vec![Some(year)]],
            }),
            ..Default::default()
        }
    }

    fn query() -> StructuredQuery {
        StructuredQuery {
            authors: vec!["Ji".into(), "Gao".into()],
            year: Some(2004),
            journal: Some("Journal of the Mechanics and Physics of Solids".into()),
            title: Some("Mechanical properties of nanostructured biological materials".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_puts_best_match_first() {
        let good = record(
            "Mechanical properties of nanostructured biological materials",
            "Journal of the Mechanics and Physics of Solids",
            2004,
            &["Ji", "Gao"],
        );
        let bad = record("Something about polymers", "Macromolecules", 1998, &["Xu"]);
        let ranked = Ranker::new().rank(vec![bad.clone(), good.clone()], &query());
        assert_eq!(ranked[0], good);
        assert_eq!(ranked[1], bad);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let candidates = vec![
            record("Alpha", "Journal A", 2004, &["Ji"]),
            record("Beta", "Journal B", 2004, &["Gao"]),
            record("Gamma", "Journal C", 2003, &["Wu"]),
        ];
        let ranker = Ranker::new();
        let first = ranker.rank(candidates.clone(), &query());
        let second = ranker.rank(candidates, &query());
        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_ties_keep_service_order() {
        let twin_a = record("Unrelated one", "Elsewhere", 1990, &["Foo"]);
        let twin_b = record("Unrelated two", "Elsewhere", 1990, &["Bar"]);
        // Neither scores any points; service order must survive.
        let ranked = Ranker::new().rank(vec![twin_a.clone(), twin_b.clone()], &query());
        assert_eq!(ranked, vec![twin_a, twin_b]);
    }

    #[test]
    fn test_decide_zero_candidates_is_no_match() {
        assert_eq!(
            Ranker::new().decide(Vec::new(), &query()),
            MatchOutcome::NoMatch
        );
    }

    #[test]
    fn test_decide_single_candidate_auto_accepts() {
        let only = record("Whatever the title", "Anywhere", 1980, &["Someone"]);
        let outcome = Ranker::new().decide(vec![only.clone()], &query());
        assert_eq!(outcome, MatchOutcome::Resolved(only));
    }

    #[test]
    fn test_decide_dominant_high_confidence_auto_accepts() {
        let exact = record(
            "Mechanical properties of nanostructured biological materials",
            "Journal of the Mechanics and Physics of Solids",
            2004,
            &["Ji", "Gao"],
        );
        let other = record("A different paper entirely", "Elsewhere", 2011, &["Kim"]);
        let outcome = Ranker::new().decide(vec![other, exact.clone()], &query());
        assert_eq!(outcome, MatchOutcome::Resolved(exact));
    }

    #[test]
    fn test_decide_ambiguous_candidates_need_selection() {
        let near_a = record(
            "Mechanical properties of nanostructured materials",
            "Journal of the Mechanics and Physics of Solids",
            2004,
            &["Ji", "Gao"],
        );
        let near_b = near_a.clone();
        match Ranker::new().decide(vec![near_a, near_b], &query()) {
            MatchOutcome::NeedsSelection(candidates) => assert_eq!(candidates.len(), 2),
            other => panic!("expected NeedsSelection, got {other:?}"),
        }
    }

    #[test]
    fn test_decide_without_query_title_never_auto_accepts_pairs() {
        let query = StructuredQuery {
            journal: Some("Physical Review Materials".into()),
            year: Some(2021),
            volume: Some("5".into()),
            ..Default::default()
        };
        let a = record("Paper one", "Physical Review Materials", 2021, &["Li"]);
        let b = record("Paper two", "Physical Review Materials", 2020, &["Yu"]);
        match Ranker::new().decide(vec![a, b], &query) {
            MatchOutcome::NeedsSelection(candidates) => assert_eq!(candidates.len(), 2),
            other => panic!("expected NeedsSelection, got {other:?}"),
        }
    }
}
