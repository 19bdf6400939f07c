//! Error types for madang-core.
//!
//! Each subsystem gets its own error enum: embedding backend failures,
//! vector index failures, and search-level failures. Load-time problems
//! (missing or corrupt artifacts) are recovered with safe defaults at the
//! call site and never surface through these types; query-time problems do
//! surface, because they indicate a startup ordering bug rather than a data
//! condition.

use thiserror::Error;

/// Errors from the embedding backend.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// The backend failed to produce vectors
    #[error("embedding backend failed: {0}")]
    Backend(String),
    /// The backend returned the wrong number of vectors for a batch
    #[error("embedding batch mismatch: sent {sent} texts, got {got} vectors")]
    BatchMismatch {
        /// Number of texts sent to the backend
        sent: usize,
        /// Number of vectors received
        got: usize,
    },
}

/// Errors from the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A query was issued before any index was loaded or built.
    ///
    /// An index with zero vectors is a valid (empty) state; this error only
    /// fires when no index object exists at all.
    #[error("vector index not initialized; ingest or load before searching")]
    Uninitialized,
    /// Vector dimension does not match the index
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected vector dimension
        expected: usize,
        /// Actual dimension received
        actual: usize,
    },
    /// Embedding generation failed during ingest or query
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    /// Filesystem error while persisting artifacts
    #[error("index I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Metadata (de)serialization failed
    #[error("metadata serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The binary index file failed validation
    #[error("corrupt index file: {0}")]
    Corrupt(String),
}

/// Errors surfaced by the search engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The underlying vector index failed
    #[error(transparent)]
    Index(#[from] IndexError),
    /// The query was rejected before reaching the index
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Validates that a vector has the expected dimension.
pub fn validate_dimension(expected: usize, actual: usize) -> Result<(), IndexError> {
    if actual == expected {
        Ok(())
    } else {
        Err(IndexError::DimensionMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dimension() {
        assert!(validate_dimension(3, 3).is_ok());
        assert!(matches!(
            validate_dimension(3, 2),
            Err(IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = IndexError::Uninitialized;
        assert!(err.to_string().contains("not initialized"));

        let err = EmbeddingError::BatchMismatch { sent: 4, got: 2 };
        assert!(err.to_string().contains("sent 4"));
    }
}
