//! Extraction steps of the reference parsing pipeline.
//!
//! Each step is a pure function over the remaining unconsumed text; the
//! composition order lives in [`ReferenceParser::parse`](super::ReferenceParser::parse).
//! Steps that cannot extract with confidence return the text untouched;
//! fields are left empty rather than guessed.

use crate::abbrev::AbbreviationTable;
use crate::regex::Regex;
use crate::utils::{normalize_whitespace, title_case};
use std::ops::Range;
use std::sync::LazyLock;

pub(crate) const MIN_YEAR: u16 = 1900;

// Year: a parenthesized 4-digit token is preferred over a bare one.
static YEAR_PAREN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d{4})\)").unwrap());
static YEAR_BARE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

// Author lists, anchored at the start of the remaining text.
//
// Three shapes: initials-first ("G. Thomas and M. J. Whelan"), surname-first
// ("Smith, J., and Doe, A. B."), and the compact index style with no period
// after the initials ("Ji B, Gao H"). A trailing "et al." is consumed and
// dropped. The compact shape requires at least two comma-separated entries;
// a lone "Vitamin D" must not read as an author.
static AUTHORS_INITIALS_FIRST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Z]\.\s*){1,3}[A-Z][A-Za-z'’-]+(?:(?:\s*,\s*(?:and\s+|&\s*)?|\s+(?:and|&)\s+)(?:[A-Z]\.\s*){1,3}[A-Z][A-Za-z'’-]+)*(?:\s*,?\s*et\s+al\.?)?",
    )
    .unwrap()
});
static AUTHORS_SURNAME_FIRST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Z][A-Za-z'’-]+,\s*(?:[A-Z]\.\s*){1,3}(?:(?:,\s*(?:and\s+|&\s*)?|\s+(?:and|&)\s+)[A-Z][A-Za-z'’-]+,\s*(?:[A-Z]\.\s*){1,3})*(?:\s*,?\s*et\s+al\.?)?",
    )
    .unwrap()
});
static AUTHORS_COMPACT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Z][A-Za-z'’-]+\s+[A-Z]{1,3}\b(?:\s*,\s*[A-Z][A-Za-z'’-]+\s+[A-Z]{1,3}\b)+(?:\s*,?\s*et\s+al\.?)?",
    )
    .unwrap()
});
static AUTHORS_ET_AL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z'’-]+(?:\s+[A-Z]{1,3}\b|\s*,\s*(?:[A-Z]\.\s*){1,3})?\s*et\s+al\.?")
        .unwrap()
});

// Surname capture patterns, applied to a matched author segment only.
static SURNAME_AFTER_INITIALS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[A-Z]\.\s*){1,3}([A-Z][A-Za-z'’-]+)").unwrap());
static SURNAME_BEFORE_INITIALS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][A-Za-z'’-]+),\s*(?:[A-Z]\.\s*){1,3}").unwrap());
static SURNAME_COMPACT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][A-Za-z'’-]+)\s+[A-Z]{1,3}\b").unwrap());
static SURNAME_LEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Za-z'’-]+)").unwrap());

// Volume/page locators, most specific first: "52(9):1963", "52:1963",
// "vol. 4, p. 511", "4, 511".
static LOCATOR_VOL_ISSUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,4})\s*\(\s*\d+(?:[-–]\d+)?\s*\)\s*[:,]\s*([A-Za-z]?\d+(?:[-–]\d+)?)\b")
        .unwrap()
});
static LOCATOR_COLON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,4})\s*:\s*([A-Za-z]?\d+(?:[-–]\d+)?)\b").unwrap());
static LOCATOR_LABELED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bvol\.?\s*(\d{1,4})\s*,?\s*(?:no\.?\s*\d+\s*,?\s*)?p{1,2}\.?\s*([A-Za-z]?\d+(?:[-–]\d+)?)\b")
        .unwrap()
});
static LOCATOR_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,4})\s*,\s*([A-Za-z]?\d+(?:[-–]\d+)?)\b").unwrap());

// Journal fallbacks when the abbreviation table has no hit.
static ALL_CAPS_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}(?:\s+[A-Z]+)+\b").unwrap());
static SENTENCE_END_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{4,}[.!?]\s").unwrap());
static CAP_RUN_FRAGMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Za-z.'’-]*(?:\s+(?:of|the|and|in|for|[A-Z][A-Za-z.'’-]*)){1,7}$")
        .unwrap()
});

// Titles.
static QUOTED_TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]{12,300})"|“([^”]{12,300})”"#).unwrap());
static LEADING_ORDINAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?\d{1,3}[.)]\s*").unwrap());

/// Extracts the publication year and removes it from the text.
///
/// A parenthesized `(YYYY)` wins over a bare token; both are range-checked
/// against `min ..= max` before being accepted.
pub(crate) fn take_year(text: &str, min: u16, max: u16) -> (Option<u16>, String) {
    for regex in [&*YEAR_PAREN_REGEX, &*YEAR_BARE_REGEX] {
        for caps in regex.captures_iter(text) {
            let digits = caps.get(1).map_or("", |m| m.as_str());
            let Ok(year) = digits.parse::<u16>() else {
                continue;
            };
            if (min..=max).contains(&year) {
                let span = caps.get(0).map_or(0..0, |m| m.start()..m.end());
                let remaining =
                    normalize_whitespace(&format!("{} {}", &text[..span.start], &text[span.end..]));
                return (Some(year), remaining);
            }
        }
    }
    (None, text.to_string())
}

/// Extracts a leading author list, returning the surnames in citation order
/// and the remaining text.
///
/// The extraction refuses to consume tokens the later steps need: a match
/// that ends right before a period is an abbreviated word, not a surname,
/// and a match containing a known journal abbreviation is no author list.
pub(crate) fn take_authors(table: &AbbreviationTable, text: &str) -> (Vec<String>, String) {
    let shapes: [(&Regex, &Regex, bool); 4] = [
        (
            &AUTHORS_INITIALS_FIRST_REGEX,
            &SURNAME_AFTER_INITIALS_REGEX,
            true,
        ),
        (
            &AUTHORS_SURNAME_FIRST_REGEX,
            &SURNAME_BEFORE_INITIALS_REGEX,
            false,
        ),
        (&AUTHORS_COMPACT_REGEX, &SURNAME_COMPACT_REGEX, false),
        (&AUTHORS_ET_AL_REGEX, &SURNAME_LEADING_REGEX, false),
    ];

    for (pattern, surname_pattern, dot_guard) in shapes {
        let Some(matched) = pattern.find(text) else {
            continue;
        };
        if dot_guard && text.as_bytes().get(matched.end()) == Some(&b'.') {
            continue;
        }
        let span = matched.as_str();
        if table.find_in(span).is_some() {
            continue;
        }
        let surnames: Vec<String> = surname_pattern
            .captures_iter(span)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();
        if surnames.is_empty() {
            continue;
        }
        let rest = text[matched.end()..]
            .trim_start()
            .trim_start_matches([',', ';'])
            .trim_start()
            .to_string();
        return (surnames, rest);
    }

    (Vec::new(), text.to_string())
}

/// A matched volume/page locator.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Locator {
    pub(crate) range: Range<usize>,
    pub(crate) volume: String,
    pub(crate) pages: String,
}

/// Finds the first volume/page pattern in the text, trying the most specific
/// shapes first so that `"52(9):1963-1990"` does not degrade to a bare
/// number pair.
pub(crate) fn find_locator(text: &str) -> Option<Locator> {
    for regex in [
        &*LOCATOR_VOL_ISSUE_REGEX,
        &*LOCATOR_COLON_REGEX,
        &*LOCATOR_LABELED_REGEX,
        &*LOCATOR_COMMA_REGEX,
    ] {
        if let Some(caps) = regex.captures(text) {
            let whole = caps.get(0)?;
            return Some(Locator {
                range: whole.start()..whole.end(),
                volume: caps.get(1)?.as_str().to_string(),
                pages: caps.get(2)?.as_str().to_string(),
            });
        }
    }
    None
}

/// A recognized journal segment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JournalSpan {
    pub(crate) range: Range<usize>,
    pub(crate) name: String,
}

/// Locates the journal in the remaining text.
///
/// Precedence: a word-boundary abbreviation-table hit (substituting the
/// canonical name), then an ALL-CAPS multi-word run, then a capitalized
/// multi-word run directly preceding the volume/page locator. The two
/// fallbacks only search the text before the locator.
pub(crate) fn find_journal(
    table: &AbbreviationTable,
    text: &str,
    locator_start: Option<usize>,
) -> Option<JournalSpan> {
    if let Some((range, canonical)) = table.find_in(text) {
        // With a locator present, the journal segment must sit directly in
        // front of it; a stray table key inside the title (e.g. "cell" in
        // "stem cell differentiation") does not name the journal.
        let adjacent = match locator_start {
            Some(start) => range.end <= start && start - range.end <= 3,
            None => true,
        };
        if adjacent {
            return Some(JournalSpan {
                range,
                name: canonical.to_string(),
            });
        }
    }

    let slice_end = locator_start.unwrap_or(text.len());
    let slice = &text[..slice_end];

    if let Some(matched) = ALL_CAPS_RUN_REGEX.find(slice) {
        if matched.as_str().len() > 5 {
            return Some(JournalSpan {
                range: matched.start()..matched.end(),
                name: title_case(matched.as_str()),
            });
        }
    }

    // A capitalized run right before "52:1963" is journal-shaped even when
    // the table does not know it, e.g. an unlisted "Acta Metallurgica".
    if locator_start.is_some() {
        return find_trailing_run(slice);
    }
    None
}

/// Finds a trailing capitalized multi-word run in the slice preceding the
/// locator, skipping everything up to the last sentence boundary (a
/// lower-case word of four letters or more followed by `. `).
fn find_trailing_run(slice: &str) -> Option<JournalSpan> {
    let fragment_start = SENTENCE_END_REGEX
        .find_iter(slice)
        .last()
        .map_or(0, |m| m.end());
    let fragment = slice[fragment_start..].trim();
    if fragment.is_empty() || !CAP_RUN_FRAGMENT_REGEX.is_match(fragment) {
        return None;
    }
    let start = fragment_start + slice[fragment_start..].find(fragment).unwrap_or(0);
    let name = fragment.trim_end_matches(['.', ',']).to_string();
    Some(JournalSpan {
        range: start..start + fragment.len(),
        name,
    })
}

/// Extracts an explicitly quoted title span, the one cue that is confident
/// on its own.
pub(crate) fn take_quoted_title(text: &str) -> Option<String> {
    let caps = QUOTED_TITLE_REGEX.captures(text)?;
    let quoted = caps.get(1).or_else(|| caps.get(2))?;
    Some(quoted.as_str().trim().to_string())
}

/// Extracts the residual-text title candidate: the segment before the
/// journal/locator cut, trimmed of ordinals and separators.
pub(crate) fn residual_title(text: &str, cut: Option<usize>) -> Option<String> {
    let segment = &text[..cut.unwrap_or(text.len())];
    let segment = LEADING_ORDINAL_REGEX.replace(segment.trim(), "");
    let cleaned = segment
        .trim_matches(|c: char| c.is_whitespace() || ".,;:-–—\"'".contains(c))
        .to_string();

    // Prefer an empty field over a guess: a plausible title has at least two
    // words and some length to it.
    if cleaned.len() >= 8 && cleaned.split_whitespace().count() >= 2 {
        Some(cleaned)
    } else {
        None
    }
}
