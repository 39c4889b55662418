//! Pasal extraction from raw document text.
//!
//! A heading is a line that consists solely of "Pasal" followed by
//! horizontal whitespace and a run of digits (case-insensitive, surrounding
//! spaces and tabs allowed). A heading never spans a line break. Everything
//! between one heading and the next belongs to the first heading's Pasal.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{Fragment, Pasal};

/// Pasal heading: the whole (trimmed) line must be "Pasal <digits>".
///
/// Group 1 is the verbatim label, group 2 the article number. Only tabs and
/// space separators count as whitespace; a trailing `\r` is tolerated.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PASAL_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[\t\p{Zs}]*(Pasal[\t\p{Zs}]+([0-9]+))[\t\p{Zs}]*\r?$").expect("valid regex")
});

/// A heading match inside one fragment.
struct Heading<'t> {
    start: usize,
    end: usize,
    label: &'t str,
    digits: &'t str,
}

/// Find all Pasal headings in a text, in order of appearance.
fn find_headings(text: &str) -> Vec<Heading<'_>> {
    PASAL_HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Heading {
                start: whole.start(),
                end: whole.end(),
                label: caps.get(1)?.as_str().trim(),
                digits: caps.get(2)?.as_str(),
            })
        })
        .collect()
}

/// Extract the Pasal records of a single fragment.
///
/// Fragments are processed in isolation: a Pasal whose body continues on the
/// next page ends at the fragment boundary.
///
/// # Examples
/// ```
/// use asisten_core::Fragment;
/// use asisten_core::extract::extract_fragment;
///
/// let fragment = Fragment::new("Pasal 7\n  Isi pasal.  \n", "uu.txt", None);
/// let pasals = extract_fragment(&fragment);
///
/// assert_eq!(pasals.len(), 1);
/// assert_eq!(pasals[0].number, 7);
/// assert_eq!(pasals[0].body, "Isi pasal.");
/// ```
#[must_use]
pub fn extract_fragment(fragment: &Fragment) -> Vec<Pasal> {
    let text = fragment.content.as_str();
    let headings = find_headings(text);

    let mut pasals = Vec::with_capacity(headings.len());

    for (i, heading) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map_or(text.len(), |next| next.start);
        let body = text[heading.end..end].trim();

        if body.is_empty() {
            tracing::debug!(
                label = heading.label,
                source = %fragment.source,
                "Pasal heading without body, skipping"
            );
            continue;
        }

        // Zero or overflowing numbers still delimit the previous body.
        let number = match heading.digits.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                tracing::debug!(
                    label = heading.label,
                    source = %fragment.source,
                    "Pasal number out of range, skipping"
                );
                continue;
            }
        };

        pasals.push(Pasal {
            number,
            label: heading.label.to_string(),
            body: body.to_string(),
            source: fragment.source.clone(),
            page: fragment.page,
        });
    }

    pasals
}

/// Extract Pasal records from a sequence of fragments, preserving order.
#[must_use]
pub fn extract_pasals(fragments: &[Fragment]) -> Vec<Pasal> {
    fragments.iter().flat_map(extract_fragment).collect()
}
