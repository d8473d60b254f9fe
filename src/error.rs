//! Crate-wide error type.
//!
//! Modeled on the reference backend's `ApiError`/`LLMError` split: named
//! variants per failure category, a `retryable()` predicate carried
//! alongside the error (not bolted on as a separate flag), and `#[from]`
//! conversions for the handful of upstream error types enrichment code
//! actually touches.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("no ontology entity found for table {table}")]
    NoEntityFound { table: String },

    #[error("chunk {chunk_index} of {total_chunks} failed: {source}")]
    ChunkFailed {
        chunk_index: usize,
        total_chunks: usize,
        #[source]
        source: Box<EnrichmentError>,
    },

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("LLM response parsing error: {0}")]
    LlmParse(String),

    #[error("LLM request timed out after {0}s")]
    LlmTimeout(u64),

    #[error("LLM rate limited, retry after {0}s")]
    LlmRateLimited(u64),

    #[error("LLM authentication failed: {0}")]
    LlmAuth(String),

    #[error("LLM request failed validation: {0}")]
    LlmValidation(String),

    #[error("circuit breaker open, failing fast")]
    CircuitOpen,

    #[error("operation cancelled")]
    Cancelled,

    #[error("schema discoverer error: {0}")]
    Discoverer(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl EnrichmentError {
    pub fn no_entity(table: impl Into<String>) -> Self {
        Self::NoEntityFound { table: table.into() }
    }

    pub fn chunk_failed(chunk_index: usize, total_chunks: usize, source: EnrichmentError) -> Self {
        Self::ChunkFailed { chunk_index, total_chunks, source: Box::new(source) }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether the retry policy should keep retrying this error.
    ///
    /// Mirrors `LLMError::is_retryable` in the reference backend. Per the
    /// open question in the design notes, callers that want to short-circuit
    /// non-retryable errors must check this flag themselves; the retry
    /// policy's default behaviour is to retry regardless (documented, not
    /// silently assumed).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LlmTimeout(_) | Self::LlmRateLimited(_) | Self::LlmApi(_) | Self::Discoverer(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen)
    }
}
