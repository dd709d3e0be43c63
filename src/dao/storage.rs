use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by key-value backends regardless of where the bytes live.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be read from or written to.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable context (usually the key or path involved).
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A record could not be encoded before being written.
    #[error("failed to encode record `{key}`")]
    Encode {
        /// Key of the record being written.
        key: String,
        /// Serializer failure.
        #[source]
        source: serde_json::Error,
    },
    /// The key cannot be mapped onto the backend (e.g. path separators in a file store).
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
