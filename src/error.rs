//! Error types for the intent router

use thiserror::Error;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug)]
pub enum RouterError {

    // =============================
    // Catalog / Configuration Errors
    // =============================

    #[error("Duplicate intent id: {0}")]
    DuplicateIntent(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Duplicate key '{key}' in {table} dictionary")]
    DuplicateLookupKey { table: &'static str, key: String },

    #[error("Unknown intent: {0}")]
    UnknownIntent(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // Backend Errors
    // =============================

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
