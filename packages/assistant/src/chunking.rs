//! Splitting fragments into overlapping retrieval chunks.

use asisten_core::{Citation, Fragment};
use text_splitter::{ChunkConfig, TextSplitter};

use crate::error::{AssistantError, Result};

/// A retrieval unit: a window of fragment text with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
}

impl Chunk {
    /// Citation pointing at this chunk.
    #[must_use]
    pub fn to_citation(&self) -> Citation {
        Citation::new(self.text.clone(), self.source.clone(), self.page)
    }
}

/// Split fragments into chunks of at most `size` characters.
///
/// Consecutive chunks of one fragment share up to `overlap` characters.
/// The splitter prefers paragraph, then line, then word boundaries.
/// Chunks never span fragments, so every chunk keeps a single source and page.
pub fn chunk_fragments(fragments: &[Fragment], size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    let config = ChunkConfig::new(size)
        .with_overlap(overlap)
        .map_err(|e| AssistantError::Config(format!("invalid chunking parameters: {e}")))?;
    let splitter = TextSplitter::new(config);

    let chunks: Vec<Chunk> = fragments
        .iter()
        .flat_map(|fragment| {
            splitter
                .chunks(&fragment.content)
                .filter(|text| !text.trim().is_empty())
                .map(|text| Chunk {
                    text: text.to_string(),
                    source: fragment.source.clone(),
                    page: fragment.page,
                })
        })
        .collect();

    tracing::debug!(fragments = fragments.len(), chunks = chunks.len(), "Chunked fragments");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_fragment_is_one_chunk() {
        let fragments = [Fragment::new("Pasal 1\nKetentuan umum.", "uu.txt", Some(2))];
        let chunks = chunk_fragments(&fragments, 900, 200).unwrap();

        assert_eq!(
            chunks,
            vec![Chunk {
                text: "Pasal 1\nKetentuan umum.".to_string(),
                source: "uu.txt".to_string(),
                page: Some(2),
            }]
        );
    }

    #[test]
    fn test_long_fragment_respects_size() {
        let text = "Setiap orang berhak atas perlindungan data pribadi. ".repeat(40);
        let fragments = [Fragment::new(text, "uu.txt", None)];
        let chunks = chunk_fragments(&fragments, 200, 50).unwrap();

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 200));
        assert!(chunks.iter().all(|c| c.source == "uu.txt"));
    }

    #[test]
    fn test_chunks_do_not_span_fragments() {
        let fragments = [
            Fragment::new("Halaman satu.", "a.txt", Some(1)),
            Fragment::new("Halaman dua.", "a.txt", Some(2)),
            Fragment::new("   ", "a.txt", Some(3)),
        ];
        let chunks = chunk_fragments(&fragments, 900, 200).unwrap();

        let pages: Vec<_> = chunks.iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_overlap_larger_than_size() {
        let fragments = [Fragment::new("x", "a.txt", None)];
        assert!(chunk_fragments(&fragments, 100, 150).is_err());
    }
}
