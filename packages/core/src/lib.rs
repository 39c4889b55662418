//! Asisten Hukum core - deterministic Pasal lookup and intent routing.
//!
//! This crate turns raw legal document text (undang-undang, peraturan) into
//! structured Pasal records and decides, per question, whether the answer
//! comes from an exact structural lookup or from a semantic
//! retrieval-augmented generation (RAG) collaborator.
//!
//! # Example
//!
//! ```
//! use asisten_core::{Fragment, PasalIndex};
//!
//! let fragments = vec![Fragment::new(
//!     "Pasal 1\nKetentuan umum.\nPasal 2\nSanksi administratif dikenakan.",
//!     "uu.txt",
//!     Some(1),
//! )];
//! let index = PasalIndex::build(&fragments);
//!
//! assert_eq!(index.len(), 2);
//! assert_eq!(index.lookup_by_number(2)[0].body, "Sanksi administratif dikenakan.");
//! ```
//!
//! # Architecture
//!
//! - [`types`]: Fragments, Pasal records and citations
//! - [`extract`]: Pasal heading detection and body splitting
//! - [`score`]: Lexical relevance heuristic
//! - [`index`]: Immutable Pasal index with number lookup and top-K search
//! - [`intent`]: Query classification in precedence order
//! - [`router`]: Dispatch to the index or the RAG collaborator
//! - [`render`]: Answer text and source list formatting
//! - [`rag`]: Contract of the external RAG collaborator
//! - [`session`]: Session context with atomic corpus swap
//! - [`error`]: Error types and Result alias

pub mod error;
pub mod extract;
pub mod index;
pub mod intent;
pub mod rag;
pub mod render;
pub mod router;
pub mod score;
pub mod session;
pub mod types;

pub use error::{CoreError, Result};
pub use index::PasalIndex;
pub use intent::Intent;
pub use rag::{CollaboratorError, RagAnswer, RagCollaborator};
pub use render::{render, source_lines, Rendered};
pub use router::{route_question, Answer, Router};
pub use session::{ChatRole, ChatTurn, Corpus, Session};
pub use types::{Citation, Fragment, Pasal};

/// Build the Pasal index for a batch of document fragments.
///
/// Convenience alias for [`PasalIndex::build`].
#[must_use]
pub fn build_pasal_index(fragments: &[Fragment]) -> PasalIndex {
    PasalIndex::build(fragments)
}
