use crate::regex::Regex;
use std::sync::LazyLock;

static WS_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapses line breaks and runs of whitespace into single spaces.
///
/// This is the first step of every parse: line-broken fragments such as
/// `"Nat\nCommun"` must read `"Nat Commun"` before any pattern matching
/// happens. The function is idempotent.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    WS_RUN_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// Cleans a DOI string into its bare registrant form.
///
/// Strips `https://doi.org/` and `dx.doi.org` URL prefixes, `doi:` labels,
/// trailing `[doi]` markers, and surrounding noise, lower-casing the result.
/// Returns `None` when no `10.`-prefixed registrant/suffix pair can be found.
///
/// # Examples
///
/// ```
/// use bibmatch::format_doi;
///
/// assert_eq!(
///     format_doi("https://doi.org/10.1038/NCOMMS15959").as_deref(),
///     Some("10.1038/ncomms15959")
/// );
/// assert_eq!(format_doi("not a doi"), None);
/// ```
pub fn format_doi(raw: &str) -> Option<String> {
    let compact: String = raw
        .trim()
        .trim_end_matches("[doi]")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    // Everything before the "10." stem is prefix noise (URL scheme, host,
    // "doi:" label); everything after must still contain the slash that
    // separates registrant from suffix.
    let stem = compact.find("10.")?;
    let doi = compact[stem..].trim_end_matches('.');
    match doi.split_once('/') {
        Some((_, suffix)) if !suffix.is_empty() => Some(doi.to_string()),
        _ => None,
    }
}

/// Returns the first page of a page expression, leaving single pages and
/// article numbers (e.g. `"083603"`, `"e071674"`) untouched.
pub(crate) fn first_page(pages: &str) -> String {
    pages
        .split(['-', '\u{2013}'])
        .next()
        .unwrap_or(pages)
        .trim()
        .to_string()
}

/// Splits a page expression into start and optional end page.
pub(crate) fn split_page_range(pages: &str) -> (String, Option<String>) {
    let mut parts = pages
        .split(['-', '\u{2013}'])
        .map(str::trim)
        .filter(|p| !p.is_empty());
    match (parts.next(), parts.next()) {
        (Some(start), Some(end)) => (start.to_string(), Some(end.to_string())),
        _ => (pages.trim().to_string(), None),
    }
}

/// Title-cases an ALL-CAPS journal run: `"PHYSICAL REVIEW MATERIALS"` becomes
/// `"Physical Review Materials"`.
pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduces a string to lower-cased alphanumerics for equality comparison.
///
/// Journal names and titles from different services disagree on punctuation,
/// spacing, and case; comparisons in the ranker go through this form.
pub(crate) fn normalize_for_compare(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
