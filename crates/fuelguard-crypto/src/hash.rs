//! SHA-256 digests that link checkpoint records into a chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};

/// Digest length in bytes.
const DIGEST_LEN: usize = 32;

/// Hex characters kept on each side by [`ContentHash::abbreviated`].
const ABBREVIATED_SIDE: usize = 12;

/// A SHA-256 digest: a journey's genesis hash or a checkpoint signature.
///
/// Serialized and displayed as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; DIGEST_LEN]);

impl ContentHash {
    /// Plain SHA-256 of `data`.
    #[must_use]
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// SHA-256 of `data` under a named domain.
    ///
    /// The domain goes in first as an 8-byte big-endian length followed by
    /// its bytes, so a payload hashed under one domain never collides with
    /// the same payload under another.
    ///
    /// ```
    /// use fuelguard_crypto::ContentHash;
    ///
    /// let a = ContentHash::hash_with_domain("genesis", b"data");
    /// let b = ContentHash::hash_with_domain("checkpoint", b"data");
    /// assert_ne!(a, b);
    /// ```
    #[must_use]
    pub fn hash_with_domain(domain: &str, data: &[u8]) -> Self {
        let domain_len = u64::try_from(domain.len()).unwrap_or(u64::MAX);
        let digest = Sha256::new()
            .chain_update(domain_len.to_be_bytes())
            .chain_update(domain.as_bytes())
            .chain_update(data)
            .finalize();
        Self(digest.into())
    }

    /// The raw digest.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// 64-character lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex characters (either case).
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidHexEncoding`] for non-hex input,
    /// [`CryptoError::InvalidDigestLength`] when it decodes to the wrong size.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidHexEncoding)?;
        <[u8; DIGEST_LEN]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| CryptoError::InvalidDigestLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            })
    }

    /// `first12...last12`, for printed reports.
    #[must_use]
    pub fn abbreviated(&self) -> String {
        let hex = self.to_hex();
        let (head, _) = hex.split_at(ABBREVIATED_SIDE);
        let (_, tail) = hex.split_at(hex.len().saturating_sub(ABBREVIATED_SIDE));
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.abbreviated())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
