//! Embedding clients.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AssistantConfig, EmbeddingProvider};
use crate::error::{AssistantError, Result};
use crate::http::{create_client, post_json};

/// Number of texts sent per embedding request.
const EMBED_BATCH_SIZE: usize = 64;

/// Trait for embedding backends, enabling mocking in tests.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `texts`, returning one vector per input in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

fn check_count(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(AssistantError::Embedding(format!(
            "expected {expected} embeddings, got {actual}"
        )));
    }
    Ok(())
}

/// Embeddings from a local Ollama server (`POST /api/embed`).
pub struct OllamaEmbedder {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        Ok(Self {
            http: create_client(config.timeout_secs)?,
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            model: config.ollama_embed_model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let body = EmbedRequest {
                model: &self.model,
                input: batch,
            };
            let response: OllamaEmbedResponse = post_json(&self.http, &url, None, &body).await?;
            check_count(batch.len(), response.embeddings.len())?;
            vectors.extend(response.embeddings);
        }

        Ok(vectors)
    }
}

/// Embeddings from OpenAI or a compatible server (`POST /v1/embeddings`).
///
/// NOTE: Do NOT derive `Debug` on this struct, `api_key` would be exposed.
pub struct OpenAiEmbedder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| {
            AssistantError::Config(
                "OPENAI_API_KEY not set (required for EMBEDDING_PROVIDER=openai)".into(),
            )
        })?;

        Ok(Self {
            http: create_client(config.timeout_secs)?,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.openai_embed_model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let body = EmbedRequest {
                model: &self.model,
                input: batch,
            };
            let response: OpenAiEmbedResponse =
                post_json(&self.http, &url, Some(self.api_key.as_str()), &body).await?;
            check_count(batch.len(), response.data.len())?;

            // The API does not promise to keep input order.
            let mut data = response.data;
            data.sort_by_key(|item| item.index);
            vectors.extend(data.into_iter().map(|item| item.embedding));
        }

        Ok(vectors)
    }
}

/// Build the embedder selected by `EMBEDDING_PROVIDER`.
pub fn embedder_for(config: &AssistantConfig) -> Result<Arc<dyn Embedder>> {
    tracing::debug!(provider = ?config.embedding_provider, "Creating embedder");
    let embedder: Arc<dyn Embedder> = match config.embedding_provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(config)?),
        EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
    };
    Ok(embedder)
}

/// Test utilities for embeddings.
#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Deterministic bag-of-keywords embedder.
    ///
    /// Each dimension counts occurrences of one keyword in the lowercased text.
    pub struct KeywordEmbedder {
        keywords: Vec<String>,
    }

    impl KeywordEmbedder {
        pub fn new(keywords: &[&str]) -> Self {
            Self {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let folded = text.to_lowercase();
                    self.keywords
                        .iter()
                        .map(|k| folded.matches(k.as_str()).count() as f32)
                        .collect()
                })
                .collect())
        }
    }
}
