//! Retrieval-augmented generation over a processed document batch.

use std::sync::Arc;

use async_trait::async_trait;
use asisten_core::{CollaboratorError, RagAnswer, RagCollaborator};

use crate::chunking::Chunk;
use crate::config::AssistantConfig;
use crate::embeddings::Embedder;
use crate::error::{AssistantError, Result};
use crate::llm::{LlmClient, LlmRequest, Message};
use crate::retrieval::VectorStore;

/// Build the model prompt from retrieved context and the question.
pub fn build_prompt(context: &[&Chunk], question: &str) -> String {
    let context = context
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Jawab secara DESKRIPTIF dan sesuai konteks dokumen.\n\
         Jangan menambah aturan di luar konteks.\n\
         \n\
         KONTEKS:\n\
         {context}\n\
         \n\
         PERTANYAAN:\n\
         {question}\n\
         \n\
         JAWABAN:"
    )
}

/// Embedding retrieval plus chat completion over one document batch.
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LlmClient>,
    store: VectorStore,
    k: usize,
    fetch_k: usize,
    temperature: f64,
}

impl RagPipeline {
    /// Embed `chunks` and build a pipeline over them.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmClient>,
        config: &AssistantConfig,
    ) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&texts).await?
        };
        let store = VectorStore::new(chunks, vectors)?;
        tracing::info!(chunks = store.len(), "Built vector store");

        Ok(Self {
            embedder,
            llm,
            store,
            k: config.retrieval_k,
            fetch_k: config.retrieval_fetch_k,
            temperature: config.temperature,
        })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Answer a question from the indexed chunks.
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        let context = if self.store.is_empty() {
            Vec::new()
        } else {
            let query = self.embedder.embed(&[question.to_string()]).await?;
            let query = query
                .into_iter()
                .next()
                .ok_or_else(|| AssistantError::Embedding("no embedding for question".into()))?;
            self.store.search_mmr(&query, self.k, self.fetch_k)
        };
        tracing::debug!(retrieved = context.len(), "Retrieved context");

        let request = LlmRequest {
            messages: vec![Message::user(build_prompt(&context, question))],
            temperature: self.temperature,
        };
        let response = self.llm.complete(&request).await?;

        Ok(RagAnswer {
            text: response.content,
            sources: context.iter().map(|chunk| chunk.to_citation()).collect(),
        })
    }
}

#[async_trait]
impl RagCollaborator for RagPipeline {
    async fn answer(&self, query: &str) -> std::result::Result<RagAnswer, CollaboratorError> {
        self.ask(query).await.map_err(Into::into)
    }
}
