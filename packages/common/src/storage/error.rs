use thiserror::Error;

/// Errors raised by a [`PictureStore`](super::PictureStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// No picture is stored under the given key.
    #[error("picture not found: {0}")]
    NotFound(String),
    #[error("picture storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The key is not a 64-character hex SHA-256 digest.
    #[error("invalid picture key: {0}")]
    InvalidKey(String),
    #[error("picture exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge { actual: u64, limit: u64 },
}
