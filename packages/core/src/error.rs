//! Error types for the core.
//!
//! Deterministic lookups never fail: an empty result only means "try the
//! next strategy". The variants here cover caller preconditions and
//! failures of the external RAG collaborator, which are surfaced unchanged.

use thiserror::Error;

use crate::rag::CollaboratorError;

/// Main error type for the core library.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A question was asked before any document batch was processed.
    #[error("No documents indexed yet. Process a document batch before asking questions")]
    NoDocuments,

    /// A process action was triggered without any document fragments.
    #[error("Document batch is empty. Select at least one document")]
    EmptyBatch,

    /// The RAG collaborator failed (transport, model or retrieval error).
    #[error("RAG collaborator failed: {0}")]
    Collaborator(#[source] CollaboratorError),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
