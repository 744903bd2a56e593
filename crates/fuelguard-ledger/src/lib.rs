//! Fuelguard Ledger - tamper-evident checkpoint ledger for fuel transport.
//!
//! This crate provides:
//! - A fuel discrepancy classifier
//! - Hash-chained checkpoint entries (each binds the hash of the previous)
//! - The journey lifecycle (`in_transit` -> `completed`, overdue as a view)
//! - Atomic, optimistic appends over a transactional KV store
//! - Chain verification and report assembly
//!
//! # Security Model
//!
//! Every journey is rooted at a genesis hash computed from its plate,
//! driver and creation time. Every checkpoint entry stores:
//! - The signature hash of its predecessor (or the genesis hash)
//! - Its own signature hash over all of its fields and that predecessor
//!
//! Verification recomputes every signature from the stored fields, so an
//! edit to any historical entry is caught at that entry. Rewriting the
//! whole chain downstream yields a final hash that no longer matches the
//! one published in the journey report.
//!
//! # Example
//!
//! ```
//! use fuelguard_ledger::{JourneyLedger, JourneyRef, JourneyRegistration, JourneyStatus, NewCheckpoint};
//!
//! let ledger = JourneyLedger::in_memory();
//! let created = ledger
//!     .register(JourneyRegistration::new("KBZ 123X", "Amina", "Mombasa", "Nairobi", 35000.0))
//!     .unwrap();
//! let journey = JourneyRef::Id(created.journey_id);
//!
//! let first = ledger
//!     .append_checkpoint(&journey, NewCheckpoint::new("Voi", "Sgt. Otieno", 34800.0))
//!     .unwrap();
//! assert_eq!(first.entry.previous_hash, created.genesis_hash);
//!
//! let last = ledger
//!     .append_checkpoint(&journey, NewCheckpoint::new("Nairobi", "Cpl. Wanjiru", 34100.0))
//!     .unwrap();
//! assert_eq!(last.status, JourneyStatus::Completed);
//!
//! // Verify chain integrity
//! let result = ledger.verify(&journey).unwrap();
//! assert!(result.valid);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod chain;
pub mod prelude;

mod discrepancy;
mod entry;
mod error;
mod journey;
mod ledger;
mod overview;
mod report;
mod storage;
mod verify;

pub use discrepancy::{
    ANOMALY_INCREASE_BELOW, CRITICAL_LOSS_ABOVE, ConfirmationPolicy,
    DEFAULT_CONFIRMATION_LOWER_BOUND, DEFAULT_CONFIRMATION_UPPER_BOUND, FuelDiscrepancy,
    SUSPICIOUS_LOSS_ABOVE, Severity, classify,
};
pub use entry::{AppendOutcome, CheckpointEntry, NewCheckpoint, ValidCheckpoint};
pub use error::{LedgerError, LedgerResult};
pub use journey::{
    DerivedStatus, Journey, JourneyRegistration, JourneyStatus, derive_status,
    status_after_checkpoint,
};
pub use ledger::{
    CheckpointPreview, DEFAULT_APPEND_ATTEMPTS, DEFAULT_OVERDUE_HOURS, JourneyCreated,
    JourneyLedger, JourneyRef, LedgerSettings,
};
pub use overview::JourneyOverview;
pub use report::{JourneyReport, ReportEntry, VerificationCode};
pub use storage::{ChainTail, CheckpointCommit, KvLedgerStorage, LedgerStorage};
pub use verify::{ChainIssue, VerificationResult, chain_order, verify_entries};
