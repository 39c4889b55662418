//! Answer and source list formatting.

use std::collections::HashSet;

use crate::types::{Citation, Pasal};

/// Separator placed between rendered Pasal blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Maximum snippet length (in characters) of a formatted source line.
pub const SNIPPET_CHARS: usize = 220;

/// Rendered answer text with its citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Provenance line closing a rendered Pasal block.
///
/// `(Sumber: uu.txt, halaman 3)`, or `(Sumber: uu.txt)` without a page.
#[must_use]
pub fn provenance_line(source: &str, page: Option<u32>) -> String {
    match page {
        Some(page) => format!("(Sumber: {source}, halaman {page})"),
        None => format!("(Sumber: {source})"),
    }
}

/// Parse a provenance line back into its source and page.
///
/// The rendered form cannot tell a page-less source whose name ends in
/// `, halaman <digits>` from a paged one: `(Sumber: lampiran, halaman 2)`
/// always parses as source `lampiran`, page 2. Callers that need exact
/// provenance for such names should read [`Rendered::citations`] instead.
///
/// # Examples
/// ```
/// use asisten_core::render::parse_provenance;
///
/// assert_eq!(
///     parse_provenance("(Sumber: uu.txt, halaman 3)"),
///     Some(("uu.txt".to_string(), Some(3)))
/// );
/// assert_eq!(parse_provenance("(Sumber: uu.txt)"), Some(("uu.txt".to_string(), None)));
/// assert_eq!(parse_provenance("Sumber: uu.txt"), None);
/// ```
#[must_use]
pub fn parse_provenance(line: &str) -> Option<(String, Option<u32>)> {
    let inner = line
        .trim()
        .strip_prefix("(Sumber: ")?
        .strip_suffix(')')?;

    if let Some((source, page)) = inner.rsplit_once(", halaman ") {
        if let Ok(page) = page.parse::<u32>() {
            return Some((source.to_string(), Some(page)));
        }
    }

    Some((inner.to_string(), None))
}

/// Render matched Pasal records as answer text plus citations.
///
/// Each block is the label, the body, a blank line and the provenance
/// line. Blocks keep the given order.
#[must_use]
pub fn render(pasals: &[&Pasal]) -> Rendered {
    let blocks: Vec<String> = pasals
        .iter()
        .map(|p| {
            format!(
                "{}\n{}\n\n{}",
                p.label,
                p.body,
                provenance_line(&p.source, p.page)
            )
        })
        .collect();

    Rendered {
        text: blocks.join(BLOCK_SEPARATOR),
        citations: pasals.iter().map(|p| p.to_citation()).collect(),
    }
}

/// Format citations as display lines with a content snippet.
///
/// Citations sharing `(source, page)` are shown once (first occurrence
/// wins). At most `max_items` lines are produced.
///
/// # Examples
/// ```
/// use asisten_core::{source_lines, Citation};
///
/// let lines = source_lines(&[Citation::new("Isi\n  pasal.", "uu.txt", Some(2))], 10);
/// assert_eq!(lines, vec!["uu.txt (halaman 2) — \"Isi pasal....\"".to_string()]);
/// ```
#[must_use]
pub fn source_lines(citations: &[Citation], max_items: usize) -> Vec<String> {
    let mut seen: HashSet<(&str, Option<u32>)> = HashSet::new();
    let mut lines = Vec::new();

    for citation in citations {
        if lines.len() >= max_items {
            break;
        }
        if !seen.insert((citation.source.as_str(), citation.page)) {
            continue;
        }

        let collapsed = citation.content.split_whitespace().collect::<Vec<_>>().join(" ");
        let snippet: String = collapsed.chars().take(SNIPPET_CHARS).collect();

        lines.push(match citation.page {
            Some(page) => format!("{} (halaman {page}) — \"{snippet}...\"", citation.source),
            None => format!("{} — \"{snippet}...\"", citation.source),
        });
    }

    lines
}
