//! Digest decoding errors.

use thiserror::Error;

/// A stored or supplied hash could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Not a hex string.
    #[error("hash is not valid hex")]
    InvalidHexEncoding,

    /// Hex decoded, but to the wrong number of bytes.
    #[error("hash has {actual} bytes, expected {expected}")]
    InvalidDigestLength {
        /// Required digest length.
        expected: usize,
        /// Decoded length.
        actual: usize,
    },
}

/// Shorthand for digest results.
pub type CryptoResult<T> = Result<T, CryptoError>;
