//! Journey report assembly.
//!
//! A report carries everything a renderer needs to print a verifiable
//! journey record: the journey, its chain in replay order with the
//! discrepancy of every reading, the verification result and the final
//! hash. Rendering itself happens elsewhere.

use fuelguard_core::PlateNumber;
use fuelguard_crypto::ContentHash;
use serde::{Deserialize, Serialize};

use crate::discrepancy::FuelDiscrepancy;
use crate::entry::CheckpointEntry;
use crate::error::LedgerResult;
use crate::journey::Journey;
use crate::ledger::{JourneyLedger, JourneyRef};
use crate::verify::{VerificationResult, chain_order, verify_entries};

/// Payload for the scannable verification code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// The journey's plate.
    pub plate: PlateNumber,
    /// The last signature hash, or the genesis hash.
    pub final_hash: ContentHash,
}

impl VerificationCode {
    /// The JSON text to embed in the code.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_payload(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One checkpoint line of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The stored entry.
    pub entry: CheckpointEntry,
    /// Discrepancy against the previous reading in replay order.
    pub discrepancy: FuelDiscrepancy,
}

impl ReportEntry {
    /// Truncated signature hash for print.
    #[must_use]
    pub fn signature_display(&self) -> String {
        self.entry.signature_hash.abbreviated()
    }

    /// Truncated previous hash for print.
    #[must_use]
    pub fn previous_display(&self) -> String {
        self.entry.previous_hash.abbreviated()
    }
}

/// A verifiable journey record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyReport {
    /// The journey.
    pub journey: Journey,
    /// Entries in replay order.
    pub entries: Vec<ReportEntry>,
    /// Outcome of verifying the chain.
    pub verification: VerificationResult,
    /// The last signature hash, or the genesis hash.
    pub final_hash: ContentHash,
    /// Payload for the scannable code.
    pub verification_code: VerificationCode,
}

impl JourneyReport {
    /// Assemble a report from a journey and its stored entries.
    #[must_use]
    pub fn assemble(journey: Journey, mut entries: Vec<CheckpointEntry>) -> Self {
        chain_order(&mut entries);
        let verification = verify_entries(journey.id, journey.genesis_hash, entries.clone());

        let final_hash = entries
            .last()
            .map_or(journey.genesis_hash, |e| e.signature_hash);

        let mut previous_reading = journey.initial_fuel;
        let entries = entries
            .into_iter()
            .map(|entry| {
                let discrepancy = FuelDiscrepancy::between(previous_reading, entry.fuel_reading);
                previous_reading = entry.fuel_reading;
                ReportEntry { entry, discrepancy }
            })
            .collect();

        Self {
            verification_code: VerificationCode {
                plate: journey.plate.clone(),
                final_hash,
            },
            journey,
            entries,
            verification,
            final_hash,
        }
    }

    /// Truncated genesis hash for print.
    #[must_use]
    pub fn genesis_display(&self) -> String {
        self.journey.genesis_hash.abbreviated()
    }

    /// Truncated final hash for print.
    #[must_use]
    pub fn final_display(&self) -> String {
        self.final_hash.abbreviated()
    }
}

impl JourneyLedger {
    /// Assemble the report for a journey in any status.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JourneyNotFound`](crate::LedgerError::JourneyNotFound)
    /// if the journey does not exist, or a storage error.
    pub fn report(&self, journey: &JourneyRef) -> LedgerResult<JourneyReport> {
        let journey = self.journey(journey)?;
        let entries = self.storage().get_entries(&journey.id)?;
        Ok(JourneyReport::assemble(journey, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrepancy::Severity;
    use crate::entry::NewCheckpoint;
    use crate::journey::JourneyRegistration;

    #[test]
    fn test_report_without_checkpoints_uses_genesis() {
        let ledger = JourneyLedger::in_memory();
        let created = ledger
            .register(JourneyRegistration::new("KCX 9", "A", "Mombasa", "Nairobi", 1000.0))
            .unwrap();
        let report = ledger.report(&JourneyRef::Id(created.journey_id)).unwrap();

        assert!(report.entries.is_empty());
        assert!(report.verification.valid);
        assert_eq!(report.final_hash, created.genesis_hash);
        assert_eq!(report.verification_code.final_hash, created.genesis_hash);
    }

    #[test]
    fn test_report_discrepancies_follow_readings() {
        let ledger = JourneyLedger::in_memory();
        let created = ledger
            .register(JourneyRegistration::new("KCX 10", "A", "Mombasa", "Nairobi", 35000.0))
            .unwrap();
        let journey = JourneyRef::Id(created.journey_id);
        ledger
            .append_checkpoint(&journey, NewCheckpoint::new("Voi", "O", 34800.0))
            .unwrap();
        let last = ledger
            .append_checkpoint(&journey, NewCheckpoint::new("Nairobi", "O", 33500.0))
            .unwrap();

        let report = ledger.report(&journey).unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].discrepancy.severity, Severity::Normal);
        assert_eq!(report.entries[1].discrepancy.severity, Severity::CriticalLoss);
        assert_eq!(report.final_hash, last.signature_hash());
        assert_eq!(report.final_display().len(), 27);

        let payload: serde_json::Value =
            serde_json::from_str(&report.verification_code.to_payload().unwrap()).unwrap();
        assert_eq!(payload["plate"], "KCX 10");
        assert_eq!(payload["final_hash"], last.signature_hash().to_hex());
    }
}
