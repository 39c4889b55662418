//! Lexical relevance scoring between a Pasal body and a question.

use regex::Regex;
use std::sync::LazyLock;

/// Keywords that signal a question about penalties.
///
/// A keyword present in both the question and a Pasal body is worth
/// [`SANCTION_WEIGHT`] points.
pub const SANCTION_KEYWORDS: [&str; 7] = [
    "sanksi",
    "denda",
    "pidana",
    "penjara",
    "kurungan",
    "administratif",
    "ganti rugi",
];

/// Score contributed by each sanction keyword found on both sides.
pub const SANCTION_WEIGHT: u32 = 10;

/// Query tokens: alphabetic ASCII words of at least four letters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static QUERY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("valid regex"));

/// Whether an already case-folded text mentions any sanction keyword.
#[must_use]
pub fn mentions_sanction(folded: &str) -> bool {
    SANCTION_KEYWORDS.iter().any(|k| folded.contains(k))
}

/// Relevance of a Pasal body for a question. Zero means irrelevant.
///
/// Both inputs are case-folded. Every sanction keyword that occurs in the
/// question and in the body adds [`SANCTION_WEIGHT`]; every question token
/// (alphabetic ASCII run of four or more letters) that occurs as a substring
/// of the body adds one.
/// Repeated question tokens count once per occurrence.
///
/// # Examples
/// ```
/// use asisten_core::score::score;
///
/// assert_eq!(score("Sanksi administratif dikenakan.", "apa sanksi yang berlaku?"), 11);
/// assert_eq!(score("Ketentuan umum.", "apa sanksi yang berlaku?"), 0);
/// ```
#[must_use]
pub fn score(body: &str, query: &str) -> u32 {
    let body = body.to_lowercase();
    let query = query.to_lowercase();

    let keyword_score: u32 = SANCTION_KEYWORDS
        .iter()
        .filter(|k| query.contains(*k) && body.contains(*k))
        .map(|_| SANCTION_WEIGHT)
        .sum();

    let token_score = QUERY_TOKEN
        .find_iter(&query)
        .filter(|token| body.contains(token.as_str()))
        .count();

    keyword_score.saturating_add(u32::try_from(token_score).unwrap_or(u32::MAX))
}
