//! Fuelguard Core - shared types for the fuel-transport checkpoint ledger.
//!
//! This crate provides:
//! - Journey identifiers and normalised plate numbers
//! - Opaque evidence references
//! - A UTC [`Timestamp`] wrapper with a canonical text form
//! - The [`Clock`] time source abstraction
//! - Bounded retry policy for optimistic commits

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod clock;
pub mod retry;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use retry::RetryConfig;
pub use types::{EvidenceRef, JourneyId, PlateNumber, Timestamp};
