use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use super::error::StorageError;

/// Content address of a stored picture: the SHA-256 digest of its bytes.
///
/// Identical uploads map to the same key, so a picture shared by several
/// grams is stored once.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PictureKey([u8; 32]);

impl PictureKey {
    pub fn for_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Directory name the picture is sharded under (first byte, as hex).
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// File name inside the shard directory (remaining 31 bytes, as hex).
    pub fn file_name(&self) -> String {
        hex::encode(&self.0[1..])
    }
}

impl FromStr for PictureKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(StorageError::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                s.len()
            )));
        }
        let mut digest = [0u8; 32];
        hex::decode_to_slice(s, &mut digest)
            .map_err(|e| StorageError::InvalidKey(e.to_string()))?;
        Ok(Self(digest))
    }
}

impl fmt::Debug for PictureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PictureKey({})", self.to_hex())
    }
}

impl fmt::Display for PictureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
