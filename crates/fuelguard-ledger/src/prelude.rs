//! Prelude module - commonly used types for convenient import.
//!
//! Use `use fuelguard_ledger::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use fuelguard_ledger::prelude::*;
//!
//! let ledger = JourneyLedger::in_memory();
//! let created = ledger
//!     .register(JourneyRegistration::new("KDA 421B", "Amina", "Mombasa", "Nairobi", 35000.0))
//!     .unwrap();
//!
//! let journey = JourneyRef::Id(created.journey_id);
//! ledger
//!     .append_checkpoint(&journey, NewCheckpoint::new("Voi", "Sgt. Otieno", 34800.0))
//!     .unwrap();
//!
//! assert!(ledger.verify(&journey).unwrap().valid);
//! ```

// Errors
pub use crate::{LedgerError, LedgerResult};

// Classification
pub use crate::{ConfirmationPolicy, FuelDiscrepancy, Severity, classify};

// Journeys and entries
pub use crate::{
    AppendOutcome, CheckpointEntry, DerivedStatus, Journey, JourneyRegistration, JourneyStatus,
    NewCheckpoint,
};

// Ledger and verification
pub use crate::{
    ChainIssue, CheckpointPreview, JourneyCreated, JourneyLedger, JourneyOverview, JourneyRef,
    LedgerSettings, VerificationResult,
};

// Reports
pub use crate::{JourneyReport, ReportEntry, VerificationCode};

// Storage
pub use crate::{ChainTail, KvLedgerStorage, LedgerStorage};
