//! Configuration for the model collaborators and retrieval.
//!
//! Values come from environment variables with sensible local defaults
//! (a local Ollama server). See [`AssistantConfig::from_env`].

use std::fmt;
use std::str::FromStr;

use crate::error::{AssistantError, Result};

/// Default Ollama server.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "llama3.2:3b";

/// Default chat temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Default per-request timeout in seconds.
///
/// Local models on modest hardware can take a while on long contexts.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default Ollama embedding model.
pub const DEFAULT_OLLAMA_EMBED_MODEL: &str = "nomic-embed-text";

/// Default OpenAI embedding model.
pub const DEFAULT_OPENAI_EMBED_MODEL: &str = "text-embedding-3-large";

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 900;

/// Overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Number of chunks handed to the model.
pub const DEFAULT_RETRIEVAL_K: usize = 6;

/// Number of nearest chunks considered before diversification.
pub const DEFAULT_RETRIEVAL_FETCH_K: usize = 20;

/// Embedding backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Local Ollama server (`/api/embed`).
    Ollama,
    /// OpenAI or an OpenAI-compatible server (`/v1/embeddings`).
    OpenAi,
}

impl FromStr for EmbeddingProvider {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(AssistantError::Config(format!(
                "unknown EMBEDDING_PROVIDER '{other}'. Use one of: ollama | openai"
            ))),
        }
    }
}

/// Configuration for the RAG collaborator.
///
/// `Debug` is implemented by hand so the API key never ends up in logs.
#[derive(Clone)]
pub struct AssistantConfig {
    pub ollama_base_url: String,
    pub chat_model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub embedding_provider: EmbeddingProvider,
    pub ollama_embed_model: String,
    pub openai_embed_model: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_k: usize,
    pub retrieval_fetch_k: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.into(),
            chat_model: DEFAULT_CHAT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            embedding_provider: EmbeddingProvider::Ollama,
            ollama_embed_model: DEFAULT_OLLAMA_EMBED_MODEL.into(),
            openai_embed_model: DEFAULT_OPENAI_EMBED_MODEL.into(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            retrieval_fetch_k: DEFAULT_RETRIEVAL_FETCH_K,
        }
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("ollama_base_url", &self.ollama_base_url)
            .field("chat_model", &self.chat_model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("embedding_provider", &self.embedding_provider)
            .field("ollama_embed_model", &self.ollama_embed_model)
            .field("openai_embed_model", &self.openai_embed_model)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("retrieval_k", &self.retrieval_k)
            .field("retrieval_fetch_k", &self.retrieval_fetch_k)
            .finish()
    }
}

/// Parse an optional variable, falling back to a default when unset or invalid.
fn parsed_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl AssistantConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let embedding_provider = match lookup("EMBEDDING_PROVIDER") {
            Some(value) => value.parse()?,
            None => defaults.embedding_provider,
        };

        let config = Self {
            ollama_base_url: lookup("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            chat_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.chat_model),
            temperature: parsed_or(lookup("LLM_TEMPERATURE"), defaults.temperature),
            timeout_secs: parsed_or(lookup("LLM_TIMEOUT_SECS"), defaults.timeout_secs),
            embedding_provider,
            ollama_embed_model: lookup("OLLAMA_EMBED_MODEL").unwrap_or(defaults.ollama_embed_model),
            openai_embed_model: lookup("OPENAI_EMBED_MODEL").unwrap_or(defaults.openai_embed_model),
            openai_api_key: lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()),
            openai_base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            chunk_size: parsed_or(lookup("CHUNK_SIZE"), defaults.chunk_size),
            chunk_overlap: parsed_or(lookup("CHUNK_OVERLAP"), defaults.chunk_overlap),
            retrieval_k: parsed_or(lookup("RETRIEVAL_K"), defaults.retrieval_k),
            retrieval_fetch_k: parsed_or(lookup("RETRIEVAL_FETCH_K"), defaults.retrieval_fetch_k),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for inconsistent values.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(AssistantError::Config("CHUNK_SIZE must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AssistantError::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.retrieval_k == 0 {
            return Err(AssistantError::Config("RETRIEVAL_K must be positive".into()));
        }
        if self.retrieval_fetch_k < self.retrieval_k {
            return Err(AssistantError::Config(format!(
                "RETRIEVAL_FETCH_K ({}) must be at least RETRIEVAL_K ({})",
                self.retrieval_fetch_k, self.retrieval_k
            )));
        }
        if self.embedding_provider == EmbeddingProvider::OpenAi && self.openai_api_key.is_none() {
            return Err(AssistantError::Config(
                "OPENAI_API_KEY not set (required for EMBEDDING_PROVIDER=openai)".into(),
            ));
        }
        Ok(())
    }

    /// Point both chat and Ollama embeddings at another server.
    #[must_use]
    pub fn with_ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_base_url = url.into();
        self
    }

    /// Use OpenAI-compatible embeddings.
    #[must_use]
    pub fn with_openai_embeddings(
        mut self,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.embedding_provider = EmbeddingProvider::OpenAi;
        self.openai_base_url = base_url.into();
        self.openai_api_key = Some(api_key.into());
        self
    }

    /// Set chunking parameters.
    #[must_use]
    pub fn with_chunking(mut self, size: usize, overlap: usize) -> Self {
        self.chunk_size = size;
        self.chunk_overlap = overlap;
        self
    }

    /// Set retrieval parameters.
    #[must_use]
    pub fn with_retrieval(mut self, k: usize, fetch_k: usize) -> Self {
        self.retrieval_k = k;
        self.retrieval_fetch_k = fetch_k;
        self
    }
}
