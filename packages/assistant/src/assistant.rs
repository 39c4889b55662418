//! Batch processing and question answering for one user session.

use std::path::PathBuf;
use std::sync::Arc;

use asisten_core::{Answer, CoreError, Corpus, PasalIndex, Session};
use chrono::{DateTime, Utc};

use crate::chunking::chunk_fragments;
use crate::config::AssistantConfig;
use crate::embeddings::{embedder_for, Embedder};
use crate::error::Result;
use crate::llm::{LlmClient, OllamaClient};
use crate::loader::load_batch;
use crate::rag::RagPipeline;

/// How a batch was handled by [`Assistant::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The batch matched the active corpus, nothing was rebuilt.
    Reused,
    /// A new corpus was built and installed.
    Indexed,
}

/// Summary of a processed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub status: ProcessStatus,
    pub documents: Vec<String>,
    pub pasals: usize,
    pub chunks: usize,
    /// When the corpus was built. A reused batch keeps its original time.
    pub processed_at: DateTime<Utc>,
}

impl ProcessReport {
    fn from_corpus(status: ProcessStatus, corpus: &Corpus<RagPipeline>) -> Self {
        Self {
            status,
            documents: corpus.documents.clone(),
            pasals: corpus.index.len(),
            chunks: corpus.rag.len(),
            processed_at: corpus.processed_at,
        }
    }
}

/// A legal document assistant: one session plus the model clients.
pub struct Assistant {
    config: AssistantConfig,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LlmClient>,
    session: Session<RagPipeline>,
}

impl Assistant {
    /// Create an assistant with the model clients selected by `config`.
    pub fn new(config: AssistantConfig) -> Result<Self> {
        config.validate()?;
        let embedder = embedder_for(&config)?;
        let llm: Arc<dyn LlmClient> = Arc::new(OllamaClient::new(&config)?);
        Ok(Self::with_clients(config, embedder, llm))
    }

    /// Create an assistant with explicit model clients.
    pub fn with_clients(
        config: AssistantConfig,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            embedder,
            llm,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session<RagPipeline> {
        &self.session
    }

    /// Load, index and install a document batch.
    ///
    /// An unchanged batch (same names and contents as the active corpus) is
    /// not reprocessed. A new corpus is built completely before it replaces
    /// the active one, so a failure leaves the previous corpus in place.
    pub async fn process(&self, paths: &[PathBuf]) -> Result<ProcessReport> {
        let batch = load_batch(paths).await?;

        if let Some(corpus) = self.session.corpus() {
            if corpus.signature == batch.signature {
                tracing::info!(signature = %batch.signature, "Batch unchanged, reusing index");
                return Ok(ProcessReport::from_corpus(ProcessStatus::Reused, &corpus));
            }
        }

        if batch.fragments.iter().all(|f| f.content.trim().is_empty()) {
            return Err(CoreError::EmptyBatch.into());
        }

        let index = PasalIndex::build(&batch.fragments);
        let chunks = chunk_fragments(
            &batch.fragments,
            self.config.chunk_size,
            self.config.chunk_overlap,
        )?;
        let rag = RagPipeline::build(
            chunks,
            Arc::clone(&self.embedder),
            Arc::clone(&self.llm),
            &self.config,
        )
        .await?;

        let corpus = Corpus::new(index, rag, batch.signature, batch.documents);
        let report = ProcessReport::from_corpus(ProcessStatus::Indexed, &corpus);
        self.session.install(corpus);
        Ok(report)
    }

    /// Answer a question against the active corpus.
    pub async fn ask(&self, query: &str) -> Result<Answer> {
        Ok(self.session.ask(query).await?)
    }
}
