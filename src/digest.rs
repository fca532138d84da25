//! Content digests (`algorithm:encoded`) used to address blobs
//!
//! The client treats a digest as an opaque identifier: it is parsed for shape
//! only and never checked against blob content. Computing a sha256 digest is
//! offered for callers that need one before uploading.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::io::AsyncReadExt;

pub const SHA256_ALGORITHM: &str = "sha256";

/// Digest of the empty blob
pub const EMPTY_BLOB_DIGEST: &str =
    "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: &str| RegistryError::InvalidDigest {
            digest: value.to_string(),
            reason: reason.to_string(),
        };

        let (algorithm, encoded) = value
            .split_once(':')
            .ok_or_else(|| invalid("missing algorithm prefix"))?;

        if algorithm.is_empty() {
            return Err(invalid("empty algorithm"));
        }
        if !algorithm
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+._-".contains(c))
        {
            return Err(invalid("algorithm contains invalid characters"));
        }
        if encoded.is_empty() {
            return Err(invalid("empty encoded part"));
        }
        if !encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "=_-".contains(c))
        {
            return Err(invalid("encoded part contains invalid characters"));
        }

        Ok(Self(value.to_string()))
    }

    /// Compute the sha256 digest of in-memory data
    pub fn sha256(data: &[u8]) -> Self {
        Self(format!("{}:{}", SHA256_ALGORITHM, hex::encode(Sha256::digest(data))))
    }

    /// Compute the sha256 digest of a file without loading it into memory
    pub async fn sha256_file(path: &Path) -> Result<Self> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(Self(format!("{}:{}", SHA256_ALGORITHM, hex::encode(hasher.finalize()))))
    }

    pub fn algorithm(&self) -> &str {
        self.0.split_once(':').map(|(a, _)| a).unwrap_or_default()
    }

    pub fn encoded(&self) -> &str {
        self.0.split_once(':').map(|(_, e)| e).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters of the encoded part, for log lines
    pub fn short(&self) -> &str {
        let encoded = self.encoded();
        &encoded[..encoded.len().min(12)]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Digest {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
