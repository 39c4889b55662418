//! Contract of the external retrieval-augmented generation collaborator.
//!
//! The core never looks inside the collaborator: it hands over a question
//! (or a rewritten instruction) and passes the returned answer and sources
//! through unchanged. Similarity search, the vector handle and the model
//! call all live behind this trait.

use async_trait::async_trait;

use crate::types::Citation;

/// Error raised by a collaborator. Propagated to the caller as-is.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Answer produced by the RAG collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagAnswer {
    /// Generated answer text.
    pub text: String,

    /// Retrieved chunks used as context.
    pub sources: Vec<Citation>,
}

/// Semantic retrieval plus generation over the processed document batch.
#[async_trait]
pub trait RagCollaborator: Send + Sync {
    /// Answer a question from the document batch.
    async fn answer(&self, query: &str) -> std::result::Result<RagAnswer, CollaboratorError>;
}

#[async_trait]
impl<T: RagCollaborator + ?Sized> RagCollaborator for std::sync::Arc<T> {
    async fn answer(&self, query: &str) -> std::result::Result<RagAnswer, CollaboratorError> {
        (**self).answer(query).await
    }
}

/// Test utilities for the RAG contract.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Collaborator that records every query and answers with a canned reply.
    pub struct RecordingRag {
        reply: RagAnswer,
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl RecordingRag {
        pub fn new(text: &str) -> Self {
            Self {
                reply: RagAnswer {
                    text: text.to_string(),
                    sources: vec![Citation::new("potongan dokumen", "uu.txt", Some(4))],
                },
                fail: false,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new("")
            }
        }

        pub fn reply(&self) -> &RagAnswer {
            &self.reply
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().map(|q| q.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl RagCollaborator for RecordingRag {
        async fn answer(&self, query: &str) -> std::result::Result<RagAnswer, CollaboratorError> {
            if let Ok(mut queries) = self.queries.lock() {
                queries.push(query.to_string());
            }
            if self.fail {
                return Err("model unavailable".into());
            }
            Ok(self.reply.clone())
        }
    }
}
