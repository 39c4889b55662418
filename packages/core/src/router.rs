//! Intent router: deterministic Pasal lookup first, RAG otherwise.
//!
//! The router walks [`Intent::PRECEDENCE`]. For every intent whose
//! predicate matches, its handler either answers or signals
//! [`Step::Continue`]; only deterministic lookups that find nothing
//! continue. RAG handlers always answer, and their failures propagate.

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::index::PasalIndex;
use crate::intent::{referenced_pasal, Intent};
use crate::rag::RagCollaborator;
use crate::render::render;
use crate::types::Citation;

/// Number of Pasal records returned for a sanction question.
pub const SANCTION_TOP_K: usize = 5;

/// Final answer for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Intent whose handler produced the answer.
    pub intent: Intent,

    /// Answer text shown to the user.
    pub text: String,

    /// Source documents backing the answer.
    pub citations: Vec<Citation>,
}

/// Outcome of a single intent handler.
#[derive(Debug)]
enum Step {
    Continue,
    Answered(Answer),
}

/// Routes questions to the Pasal index or the RAG collaborator.
#[derive(Debug, Clone)]
pub struct Router {
    sanction_top_k: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            sanction_top_k: SANCTION_TOP_K,
        }
    }
}

impl Router {
    /// Create a router with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many Pasal records a sanction question returns.
    #[must_use]
    pub fn with_sanction_top_k(mut self, k: usize) -> Self {
        self.sanction_top_k = k;
        self
    }

    /// Answer a question.
    ///
    /// Never mutates the index. Dropping the returned future cancels the
    /// RAG call in flight.
    pub async fn route<R>(&self, index: &PasalIndex, rag: &R, query: &str) -> Result<Answer>
    where
        R: RagCollaborator + ?Sized,
    {
        let folded = query.to_lowercase();

        for intent in Intent::PRECEDENCE {
            if !intent.matches(&folded) {
                continue;
            }

            match self.handle(intent, index, rag, query, &folded).await? {
                Step::Answered(answer) => {
                    debug!(
                        intent = %intent,
                        citations = answer.citations.len(),
                        "Question answered"
                    );
                    return Ok(answer);
                }
                Step::Continue => {
                    debug!(intent = %intent, "Deterministic lookup found nothing, continuing");
                }
            }
        }

        // Generic always matches and always answers.
        self.delegate(Intent::Generic, rag, query).await
    }

    async fn handle<R>(
        &self,
        intent: Intent,
        index: &PasalIndex,
        rag: &R,
        query: &str,
        folded: &str,
    ) -> Result<Step>
    where
        R: RagCollaborator + ?Sized,
    {
        if !intent.is_deterministic() {
            return self.delegate(intent, rag, query).await.map(Step::Answered);
        }

        let pasals = if intent == Intent::SanctionLookup {
            index.top_k_relevant(query, self.sanction_top_k)
        } else {
            referenced_pasal(folded)
                .map(|number| index.lookup_by_number(number))
                .unwrap_or_default()
        };

        if pasals.is_empty() {
            return Ok(Step::Continue);
        }

        let rendered = render(&pasals);
        Ok(Step::Answered(Answer {
            intent,
            text: rendered.text,
            citations: rendered.citations,
        }))
    }

    async fn delegate<R>(&self, intent: Intent, rag: &R, query: &str) -> Result<Answer>
    where
        R: RagCollaborator + ?Sized,
    {
        let prompt = intent.rag_prompt(query);
        debug!(intent = %intent, "Delegating to RAG collaborator");

        let reply = rag.answer(&prompt).await.map_err(CoreError::Collaborator)?;

        Ok(Answer {
            intent,
            text: reply.text,
            citations: reply.sources,
        })
    }
}

/// Answer a question with the default [`Router`].
///
/// # Errors
/// Returns [`CoreError::Collaborator`] when the RAG collaborator fails.
pub async fn route_question<R>(rag: &R, index: &PasalIndex, query: &str) -> Result<Answer>
where
    R: RagCollaborator + ?Sized,
{
    Router::new().route(index, rag, query).await
}
