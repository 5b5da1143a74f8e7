//! Journal abbreviation table.
//!
//! Maps journal abbreviations (`"Nat Commun"`, `"Phys. Rev. Lett."`) to
//! canonical journal names. The table is an explicitly constructed, immutable
//! value injected into the parser rather than process-wide hidden state, which
//! keeps the parser testable against a fabricated table.
//!
//! Matching rules:
//!
//! - lookups are case-insensitive;
//! - a match must start and end on a word boundary (string bounds or a
//!   non-alphanumeric character), never inside a longer alphanumeric run, so
//!   `"nat"` can never match inside `"nanostructure"`;
//! - when one abbreviation is a prefix of another (`"Phys. Rev."` /
//!   `"Phys. Rev. Lett."`), the longest key wins.
//!
//! # Example
//!
//! ```
//! use bibmatch::AbbreviationTable;
//!
//! let table = AbbreviationTable::builtin();
//! assert_eq!(table.lookup("Nat Commun"), Some("Nature Communications"));
//! assert_eq!(table.lookup("nonexistent journal"), None);
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

const BUILTIN_JSON: &str = include_str!("journal_abbreviations.json");

static BUILTIN: LazyLock<AbbreviationTable> = LazyLock::new(|| {
    let file: AbbreviationFile =
        serde_json::from_str(BUILTIN_JSON).expect("embedded abbreviation table is valid JSON");
    AbbreviationTable::from_pairs(file.abbreviations)
});

#[derive(Deserialize)]
struct AbbreviationFile {
    abbreviations: HashMap<String, String>,
}

/// Immutable journal abbreviation → canonical name mapping.
///
/// Load once at startup; the table is read-only afterwards and safe to share
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationTable {
    /// Canonical-key lookup map.
    exact: HashMap<String, String>,
    /// Keys sorted longest-first (ties broken lexicographically) for
    /// deterministic longest-match scanning.
    ordered: Vec<(String, String)>,
}

impl AbbreviationTable {
    /// Returns the built-in table shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Builds a table from `(abbreviation, canonical name)` pairs.
    ///
    /// Keys are lower-cased and whitespace-normalized on load. Keys starting
    /// with an underscore are treated as comments and skipped, matching the
    /// on-disk resource format.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut exact = HashMap::new();
        for (key, value) in pairs {
            let key = canon_key(key.as_ref());
            if key.is_empty() || key.starts_with('_') {
                continue;
            }
            exact.insert(key, value.into());
        }

        let mut ordered: Vec<(String, String)> = exact
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { exact, ordered }
    }

    /// Number of abbreviations in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    /// Returns `true` if the table holds no abbreviations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Case-insensitive exact lookup of a whole abbreviation or phrase.
    #[must_use]
    pub fn lookup(&self, phrase: &str) -> Option<&str> {
        self.exact.get(&canon_key(phrase)).map(String::as_str)
    }

    /// Scans `text` for the longest table key occurring on word boundaries.
    ///
    /// Returns the byte range of the match in `text` together with the
    /// canonical journal name. Keys are ASCII, so byte offsets into the
    /// ASCII-lowercased haystack are valid offsets into `text`.
    #[must_use]
    pub fn find_in(&self, text: &str) -> Option<(Range<usize>, &str)> {
        let haystack = text.to_ascii_lowercase();
        let bytes = haystack.as_bytes();
        for (key, canonical) in &self.ordered {
            let mut from = 0;
            while let Some(pos) = haystack[from..].find(key.as_str()) {
                let start = from + pos;
                let end = start + key.len();
                if on_word_boundary(bytes, start, end) {
                    return Some((start..end, canonical.as_str()));
                }
                from = start + 1;
            }
        }
        None
    }
}

/// Lower-cases and whitespace-normalizes a key for exact lookup.
fn canon_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The match span must not be interior to an alphanumeric run.
fn on_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before_ok && after_ok
}
