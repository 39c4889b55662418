//! Query intent classification.
//!
//! Intents are checked in a fixed precedence order; the first one whose
//! predicate matches the case-folded question wins. [`Intent::Generic`]
//! always matches and closes the list.

use regex::Regex;
use std::sync::LazyLock;
use strum::{Display, IntoStaticStr};

use crate::score::mentions_sanction;

/// Explicit article reference in a question, e.g. "pasal 12".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PASAL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pasal\s+([0-9]+)").expect("valid regex"));

/// Instruction sent instead of the question for obligations/prohibitions.
pub const OBLIGATIONS_INSTRUCTION: &str = "Dari dokumen, buatkan:\n\
- Poin KEWAJIBAN\n\
- Poin LARANGAN\n\
Gunakan bullet point.";

/// Instruction sent instead of the question for case examples.
pub const CASE_EXAMPLE_INSTRUCTION: &str = "Berdasarkan dokumen, berikan CONTOH KASUS PENERAPAN.\n\
Jangan menambah aturan di luar dokumen.";

/// Instruction prepended to the question for summaries.
pub const SUMMARY_INSTRUCTION: &str = "Ringkas isi dokumen secara tematik.";

/// Handling strategy for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Penalty question, answered from the most relevant Pasal records.
    SanctionLookup,

    /// Explicit "Pasal N" question, answered by number lookup.
    SpecificArticleLookup,

    /// "What is this regulation about", answered by RAG with the raw question.
    AboutLookup,

    /// Thematic summary through RAG.
    Summary,

    /// Bulleted obligations and prohibitions through RAG.
    ObligationsProhibitions,

    /// Example application through RAG.
    CaseExample,

    /// Anything else, answered by RAG with the raw question.
    Generic,
}

impl Intent {
    /// All intents in precedence order.
    pub const PRECEDENCE: [Intent; 7] = [
        Intent::SanctionLookup,
        Intent::SpecificArticleLookup,
        Intent::AboutLookup,
        Intent::Summary,
        Intent::ObligationsProhibitions,
        Intent::CaseExample,
        Intent::Generic,
    ];

    /// Whether this intent's predicate matches a case-folded question.
    #[must_use]
    pub fn matches(self, folded: &str) -> bool {
        match self {
            Self::SanctionLookup => mentions_sanction(folded),
            Self::SpecificArticleLookup => PASAL_REFERENCE.is_match(folded),
            Self::AboutLookup => folded.contains("tentang apa"),
            Self::Summary => folded.contains("ringkas"),
            Self::ObligationsProhibitions => {
                folded.contains("kewajiban") || folded.contains("larangan")
            }
            Self::CaseExample => folded.contains("contoh") || folded.contains("kasus"),
            Self::Generic => true,
        }
    }

    /// Whether the intent is answered from the Pasal index.
    #[must_use]
    pub fn is_deterministic(self) -> bool {
        matches!(self, Self::SanctionLookup | Self::SpecificArticleLookup)
    }

    /// First intent whose predicate matches the question.
    ///
    /// This is the predicate outcome only; the router may still fall
    /// through a deterministic intent whose lookup finds nothing.
    ///
    /// # Examples
    /// ```
    /// use asisten_core::Intent;
    ///
    /// assert_eq!(Intent::classify("Apa SANKSI pasal 5?"), Intent::SanctionLookup);
    /// assert_eq!(Intent::classify("Pasal 1 isinya apa?"), Intent::SpecificArticleLookup);
    /// assert_eq!(Intent::classify("halo"), Intent::Generic);
    /// ```
    #[must_use]
    pub fn classify(query: &str) -> Self {
        let folded = query.to_lowercase();
        Self::PRECEDENCE
            .into_iter()
            .find(|intent| intent.matches(&folded))
            .unwrap_or(Self::Generic)
    }

    /// Question text handed to the RAG collaborator for this intent.
    ///
    /// Deterministic intents fall back to the raw question.
    #[must_use]
    pub fn rag_prompt(self, query: &str) -> String {
        match self {
            Self::Summary => format!("{SUMMARY_INSTRUCTION}\n\n{query}"),
            Self::ObligationsProhibitions => OBLIGATIONS_INSTRUCTION.to_string(),
            Self::CaseExample => CASE_EXAMPLE_INSTRUCTION.to_string(),
            Self::SanctionLookup
            | Self::SpecificArticleLookup
            | Self::AboutLookup
            | Self::Generic => query.to_string(),
        }
    }
}

/// Article number referenced in a case-folded question, if any.
///
/// Only the first reference counts. Numbers that do not fit a `u32` are
/// treated as absent.
#[must_use]
pub fn referenced_pasal(folded: &str) -> Option<u32> {
    PASAL_REFERENCE
        .captures(folded)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
