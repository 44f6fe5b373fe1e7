use hst_hist::HistError;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object is stored under the key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The key already holds an object of a different type.
    #[error("type mismatch for {key}: requested {expected}, stored {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An axis definition failed validation.
    #[error("invalid axis definition: {0}")]
    InvalidAxis(#[from] HistError),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
