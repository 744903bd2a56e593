//! Storage errors.

/// Failure of a store operation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend rejected or failed an operation.
    #[error("store backend failure: {0}")]
    Internal(String),

    /// The backend could not be opened.
    #[error("cannot open store at {0}")]
    Connection(String),

    /// A namespace or key was empty or contained the separator byte.
    #[error("invalid store key: {0}")]
    InvalidKey(String),
}

/// Shorthand for store results.
pub type StorageResult<T> = Result<T, StorageError>;
