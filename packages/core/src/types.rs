//! Core data types.
//!
//! These types represent the pieces of an uploaded legal document batch:
//! loader fragments, extracted Pasal records and the citation records shown
//! next to an answer.

use serde::{Deserialize, Serialize};

/// A piece of loaded document text with its provenance.
///
/// Loaders emit one fragment per page for paginated formats and one
/// fragment per file otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Raw text content.
    pub content: String,

    /// Originating document identifier (usually the file name).
    pub source: String,

    /// Page number, when the source format is paginated.
    pub page: Option<u32>,
}

impl Fragment {
    /// Create a new fragment.
    #[must_use]
    pub fn new(content: impl Into<String>, source: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            page,
        }
    }
}

/// A single Pasal (article) extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pasal {
    /// Article number as written in the heading (always positive).
    pub number: u32,

    /// Heading exactly as it appeared in the source (e.g., "Pasal 5").
    pub label: String,

    /// Trimmed text between this heading and the next one. Never empty.
    pub body: String,

    /// Originating document identifier.
    pub source: String,

    /// Page number of the fragment the heading was found in.
    pub page: Option<u32>,
}

impl Pasal {
    /// Citation record for this Pasal.
    #[must_use]
    pub fn to_citation(&self) -> Citation {
        Citation {
            content: self.body.clone(),
            source: self.source.clone(),
            page: self.page,
        }
    }
}

/// A source document entry displayed alongside an answer.
///
/// Produced both by deterministic lookups and by the RAG collaborator, so
/// the caller can display provenance uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Cited text.
    pub content: String,

    /// Originating document identifier.
    pub source: String,

    /// Page number, if known.
    pub page: Option<u32>,
}

impl Citation {
    /// Create a new citation.
    #[must_use]
    pub fn new(content: impl Into<String>, source: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            page,
        }
    }
}

impl From<&Fragment> for Citation {
    fn from(fragment: &Fragment) -> Self {
        Self::new(fragment.content.clone(), fragment.source.clone(), fragment.page)
    }
}
