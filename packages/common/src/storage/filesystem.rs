use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;
use tracing::debug;

use super::error::StorageError;
use super::key::PictureKey;
use super::traits::{BoxReader, PictureStore};

/// Picture store backed by a local directory.
///
/// Layout: `{root}/{shard}/{file_name}`, where the shard is the first byte of
/// the key. Writes land in `{root}/.tmp` first and are renamed into place, so
/// readers never observe a half-written picture.
pub struct FilesystemPictureStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemPictureStore {
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn path_for(&self, key: &PictureKey) -> PathBuf {
        self.root.join(key.shard()).join(key.file_name())
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl PictureStore for FilesystemPictureStore {
    async fn put(&self, data: &[u8]) -> Result<PictureKey, StorageError> {
        let actual = data.len() as u64;
        if actual > self.max_size {
            return Err(StorageError::TooLarge {
                actual,
                limit: self.max_size,
            });
        }

        let key = PictureKey::for_bytes(data);
        let target = self.path_for(&key);
        if fs::try_exists(&target).await? {
            debug!(%key, "picture already stored");
            return Ok(key);
        }

        let temp = self.temp_path();
        let written = async {
            fs::write(&temp, data).await?;
            if let Some(shard) = target.parent() {
                fs::create_dir_all(shard).await?;
            }
            fs::rename(&temp, &target).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(key)
    }

    async fn open(&self, key: &PictureKey) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.path_for(key)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_hex())),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, key: &PictureKey) -> Result<u64, StorageError> {
        match fs::metadata(self.path_for(key)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_hex())),
            Err(e) => Err(e.into()),
        }
    }
}
