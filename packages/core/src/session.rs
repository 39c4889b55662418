//! Session context: the active corpus and the chat history of one user.
//!
//! A corpus is built completely off to the side and then installed with a
//! single reference swap. Questions clone the active `Arc` before routing,
//! so a question in flight keeps answering from the corpus it started
//! with even if a new batch is installed meanwhile.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::index::PasalIndex;
use crate::rag::RagCollaborator;
use crate::router::{Answer, Router};
use crate::types::Citation;

/// Everything derived from one processed document batch.
#[derive(Debug)]
pub struct Corpus<R> {
    /// Pasal index of the batch.
    pub index: PasalIndex,

    /// RAG collaborator over the same batch.
    pub rag: R,

    /// Opaque fingerprint of the batch contents.
    pub signature: String,

    /// Display names of the documents in the batch.
    pub documents: Vec<String>,

    /// When the batch was processed.
    pub processed_at: DateTime<Utc>,
}

impl<R> Corpus<R> {
    /// Create a corpus processed now.
    #[must_use]
    pub fn new(
        index: PasalIndex,
        rag: R,
        signature: impl Into<String>,
        documents: Vec<String>,
    ) -> Self {
        Self {
            index,
            rag,
            signature: signature.into(),
            documents,
            processed_at: Utc::now(),
        }
    }
}

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message of the chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Conversation {
    turns: Vec<ChatTurn>,
    last_sources: Vec<Citation>,
    /// Bumped whenever the history is cleared.
    generation: u64,
}

/// Session with an explicit corpus lifecycle.
///
/// Created empty, populated by [`Session::install`], replaced by the next
/// install and emptied by [`Session::reset`].
#[derive(Debug)]
pub struct Session<R> {
    router: Router,
    active: RwLock<Option<Arc<Corpus<R>>>>,
    conversation: Mutex<Conversation>,
}

impl<R> Default for Session<R> {
    fn default() -> Self {
        Self::new(Router::default())
    }
}

impl<R> Session<R> {
    /// Create an empty session using the given router.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router,
            active: RwLock::new(None),
            conversation: Mutex::new(Conversation::default()),
        }
    }

    /// The active corpus, if a batch has been processed.
    #[must_use]
    pub fn corpus(&self) -> Option<Arc<Corpus<R>>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the active corpus was built from a batch with this signature.
    #[must_use]
    pub fn is_current(&self, signature: &str) -> bool {
        self.corpus().is_some_and(|c| c.signature == signature)
    }

    /// Install a fully built corpus, replacing the previous one.
    ///
    /// Returns the previous corpus, if any.
    pub fn install(&self, corpus: Corpus<R>) -> Option<Arc<Corpus<R>>> {
        let corpus = Arc::new(corpus);
        tracing::info!(
            documents = corpus.documents.len(),
            pasals = corpus.index.len(),
            signature = %corpus.signature,
            "Installing corpus"
        );
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        active.replace(corpus)
    }

    /// Drop the corpus, the chat history and the last sources.
    pub fn reset(&self) {
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.clear_history();
    }

    /// Drop the chat history and the last sources, keeping the corpus.
    pub fn clear_history(&self) {
        let mut conversation = self.conversation();
        conversation.turns.clear();
        conversation.last_sources.clear();
        conversation.generation += 1;
    }

    /// Chat history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ChatTurn> {
        self.conversation().turns.clone()
    }

    /// Sources of the most recent answer.
    #[must_use]
    pub fn last_sources(&self) -> Vec<Citation> {
        self.conversation().last_sources.clone()
    }

    fn conversation(&self) -> std::sync::MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn turn(role: ChatRole, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
            at: Utc::now(),
        }
    }
}

impl<R: RagCollaborator> Session<R> {
    /// Answer a question against the active corpus and record the exchange.
    ///
    /// # Errors
    /// - [`CoreError::NoDocuments`] when no corpus is installed. Nothing is
    ///   recorded in that case.
    /// - [`CoreError::Collaborator`] when the RAG collaborator fails. The
    ///   question stays in the history, no answer is recorded.
    ///
    /// When the history is cleared (or the session reset) while the
    /// question is being answered, the answer is still returned but not
    /// recorded.
    pub async fn ask(&self, query: &str) -> Result<Answer> {
        let corpus = self.corpus().ok_or(CoreError::NoDocuments)?;

        let generation = {
            let mut conversation = self.conversation();
            conversation.turns.push(Self::turn(ChatRole::User, query));
            conversation.generation
        };

        let answer = self.router.route(&corpus.index, &corpus.rag, query).await?;

        let mut conversation = self.conversation();
        if conversation.generation == generation {
            conversation
                .turns
                .push(Self::turn(ChatRole::Assistant, &answer.text));
            conversation.last_sources = answer.citations.clone();
        } else {
            tracing::debug!("History cleared while answering, answer not recorded");
        }

        Ok(answer)
    }
}
