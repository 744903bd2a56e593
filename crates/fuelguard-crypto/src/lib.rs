//! Fuelguard Crypto - content hashing for the checkpoint chain.
//!
//! This crate provides [`ContentHash`], a SHA-256 digest rendered as a
//! fixed-length lowercase hex string, with domain-separated hashing for
//! the genesis and checkpoint records.
//!
//! # Example
//!
//! ```
//! use fuelguard_crypto::ContentHash;
//!
//! let hash = ContentHash::hash_with_domain("example", b"payload");
//! assert_eq!(hash.to_hex().len(), 64);
//! assert_eq!(ContentHash::from_hex(&hash.to_hex()).unwrap(), hash);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod hash;

pub use error::{CryptoError, CryptoResult};
pub use hash::ContentHash;
