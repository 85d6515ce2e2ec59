use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::key::PictureKey;

pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Content-addressed storage for gram pictures.
#[async_trait]
pub trait PictureStore: Send + Sync {
    /// Store picture bytes, returning their key. Storing bytes that are
    /// already present is a no-op that returns the existing key.
    async fn put(&self, data: &[u8]) -> Result<PictureKey, StorageError>;

    /// Open a stored picture for streaming.
    async fn open(&self, key: &PictureKey) -> Result<BoxReader, StorageError>;

    async fn size(&self, key: &PictureKey) -> Result<u64, StorageError>;
}
