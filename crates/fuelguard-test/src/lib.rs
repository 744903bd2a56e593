//! Fuelguard Test - Shared test utilities for the ledger crates.
//!
//! This crate provides fixtures and a ledger harness that can be used
//! across fuelguard crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! fuelguard-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! use fuelguard_test::{LedgerHarness, test_registration};
//!
//! #[test]
//! fn test_first_checkpoint() {
//!     let harness = LedgerHarness::new();
//!     let created = harness.ledger.register(test_registration("KBZ 1")).unwrap();
//!     let outcome = harness.checkpoint(created.journey_id, "Voi", 34800.0);
//!     assert_eq!(outcome.entry.previous_hash, created.genesis_hash);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
