//! Flat in-memory vector store with maximal marginal relevance search.
//!
//! Every query scans all chunks. Document batches for a single session are
//! small enough that an approximate nearest-neighbour structure is not needed.

use std::cmp::Ordering;

use crate::chunking::Chunk;
use crate::error::{AssistantError, Result};

/// Trade-off between relevance (1.0) and diversity (0.0) in MMR selection.
pub const MMR_LAMBDA: f32 = 0.5;

/// Chunks paired with their embeddings.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity of two L2-normalized vectors.
fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl VectorStore {
    /// Create a store from chunks and their embeddings.
    ///
    /// # Errors
    /// Returns [`AssistantError::Embedding`] when the counts differ or the
    /// vectors do not share one dimension.
    pub fn new(chunks: Vec<Chunk>, mut vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(AssistantError::Embedding(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                vectors.len()
            )));
        }
        if let Some(first) = vectors.first() {
            let dim = first.len();
            if vectors.iter().any(|v| v.len() != dim) {
                return Err(AssistantError::Embedding(
                    "embeddings have inconsistent dimensions".into(),
                ));
            }
        }

        vectors.iter_mut().for_each(|v| normalize(v));
        Ok(Self { chunks, vectors })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Select `k` chunks for a query embedding.
    ///
    /// Takes the `fetch_k` most similar chunks, then picks greedily by
    /// maximal marginal relevance: `λ·sim(query, c) − (1−λ)·max sim(c, picked)`.
    /// Ties keep the earlier chunk.
    pub fn search_mmr(&self, query: &[f32], k: usize, fetch_k: usize) -> Vec<&Chunk> {
        let mut query = query.to_vec();
        normalize(&mut query);

        let mut candidates: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_sim(&query, v)))
            .collect();
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        candidates.truncate(fetch_k.max(k));

        let mut picked: Vec<usize> = Vec::with_capacity(k);
        while picked.len() < k && !candidates.is_empty() {
            let mut best = 0;
            let mut best_score = f32::NEG_INFINITY;

            for (pos, &(i, relevance)) in candidates.iter().enumerate() {
                let redundancy = picked
                    .iter()
                    .map(|&j| cosine_sim(&self.vectors[i], &self.vectors[j]))
                    .fold(f32::NEG_INFINITY, f32::max);
                let redundancy = if picked.is_empty() { 0.0 } else { redundancy };
                let score = MMR_LAMBDA * relevance - (1.0 - MMR_LAMBDA) * redundancy;

                if score > best_score {
                    best = pos;
                    best_score = score;
                }
            }

            let (i, _) = candidates.remove(best);
            picked.push(i);
        }

        picked.into_iter().map(|i| &self.chunks[i]).collect()
    }
}
