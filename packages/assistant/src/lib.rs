//! Asisten Hukum assistant - document processing, RAG collaborator and CLI.
//!
//! Wires the routing core of [`asisten_core`] to real documents and models:
//! plain-text documents are loaded into fragments, indexed into Pasal
//! records, chunked and embedded for semantic retrieval, and answered with
//! a chat model served by Ollama.
//!
//! # Architecture
//!
//! - [`config`]: Environment-driven configuration
//! - [`loader`]: Document loading and batch signatures
//! - [`chunking`]: Overlapping retrieval chunks
//! - [`embeddings`]: Ollama and OpenAI embedding clients
//! - [`retrieval`]: Flat vector store with MMR search
//! - [`llm`]: Chat model client
//! - [`rag`]: The RAG collaborator used by the router
//! - [`assistant`]: Batch processing and session handling
//! - [`http`]: HTTP client with retry
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types and Result alias

pub mod assistant;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod http;
pub mod llm;
pub mod loader;
pub mod rag;
pub mod retrieval;

pub use assistant::{Assistant, ProcessReport, ProcessStatus};
pub use config::{AssistantConfig, EmbeddingProvider};
pub use error::{AssistantError, Result};
pub use rag::RagPipeline;
