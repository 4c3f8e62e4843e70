//! Error types for the Citeguard core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the generation backend, the retrieval store, corpus collection,
//! and configuration.
//!
//! Content-quality conditions (no documents found, empty generation, low
//! verification confidence) are *not* errors: they are absorbed into the
//! normal `QueryResult` shape with warnings. Only collaborator
//! unavailability escapes `Assistant::query` as an error.

use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Top-level error type for the Citeguard core library.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from generation-backend interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from the vector store and retrieval layer.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Vector index not found: {path}")]
    IndexNotFound { path: PathBuf },

    #[error("Vector index error: {message}")]
    Index { message: String },

    #[error("Embedding dimension mismatch: index has {index}, embedder produces {embedder}")]
    DimensionMismatch { index: usize, embedder: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from Wikipedia corpus collection.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("No Wikipedia page found for: {title}")]
    PageNotFound { title: String },

    #[error("Wikipedia API request failed: {message}")]
    Http { message: String },

    #[error("Wikipedia API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },
}
