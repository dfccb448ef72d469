//! Content checksum (SHA-1 digest)
//!
//! Checksums are 40-character hexadecimal strings identifying every stored
//! object: file blobs, index snapshots and the commit graph itself.
//!
//! ## Storage
//!
//! Objects live at `.jit/objects/<first-2-chars>/<remaining-38-chars>`.

use crate::artifacts::objects::CHECKSUM_LENGTH;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};

/// Content checksum (hex-encoded SHA-1)
///
/// A 40-character lowercase hexadecimal string. The all-zeros checksum is
/// reserved for "no commit yet" branch refs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Checksum(String);

impl Checksum {
    /// Parse and validate a checksum from a string
    ///
    /// # Returns
    ///
    /// Validated checksum or an error for invalid length/characters
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != CHECKSUM_LENGTH {
            return Err(anyhow::anyhow!("Invalid checksum length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid checksum characters: {}", id));
        }
        Ok(Self(id.to_lowercase()))
    }

    /// The reserved all-zeros checksum marking an unborn branch
    pub fn zero() -> Self {
        Checksum("0".repeat(CHECKSUM_LENGTH))
    }

    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Hash a byte buffer
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);

        let digest = hasher.finalize();
        Checksum(format!("{digest:x}"))
    }

    /// Hash the contents of a file
    pub fn of_file(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Unable to hash {}: {}", path.display(), e))?;

        Ok(Self::of_bytes(&data))
    }

    /// Convert to the fan-out path used by the object store
    ///
    /// Splits the digest as `xx/yyyyyy...` where `xx` is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Abbreviated form (first 7 characters)
    pub fn to_short(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
