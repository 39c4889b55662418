//! Immutable Pasal index for one processed document batch.

use crate::extract::extract_pasals;
use crate::score::score;
use crate::types::{Fragment, Pasal};

/// Default number of results for [`PasalIndex::top_k_relevant`].
pub const DEFAULT_TOP_K: usize = 3;

/// All Pasal records of a document batch, in encounter order.
///
/// Built once per batch and never mutated afterwards; a new batch produces
/// a new index. Lookups take `&self`, so a shared index can be queried
/// concurrently without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasalIndex {
    pasals: Vec<Pasal>,
}

impl PasalIndex {
    /// Build the index by extracting every fragment of a batch.
    #[must_use]
    pub fn build(fragments: &[Fragment]) -> Self {
        let pasals = extract_pasals(fragments);
        tracing::info!(
            fragments = fragments.len(),
            pasals = pasals.len(),
            "Built Pasal index"
        );
        Self { pasals }
    }

    /// Create an index from already extracted records.
    #[must_use]
    pub fn from_pasals(pasals: Vec<Pasal>) -> Self {
        Self { pasals }
    }

    /// Number of indexed Pasal records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pasals.len()
    }

    /// Whether the batch contained no Pasal at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pasals.is_empty()
    }

    /// All records in index order.
    #[must_use]
    pub fn pasals(&self) -> &[Pasal] {
        &self.pasals
    }

    /// Every Pasal with the given number, across all source documents.
    ///
    /// Returns an empty list when nothing matches.
    #[must_use]
    pub fn lookup_by_number(&self, number: u32) -> Vec<&Pasal> {
        self.pasals.iter().filter(|p| p.number == number).collect()
    }

    /// The `k` most relevant Pasal records for a question.
    ///
    /// Records scoring zero are never returned. Equal scores keep index
    /// order.
    #[must_use]
    pub fn top_k_relevant(&self, query: &str, k: usize) -> Vec<&Pasal> {
        let mut scored: Vec<(u32, &Pasal)> = self
            .pasals
            .iter()
            .map(|p| (score(&p.body, query), p))
            .filter(|(s, _)| *s > 0)
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored.into_iter().take(k).map(|(_, p)| p).collect()
    }
}
