//! Route monitor: one row per journey with its live state.

use fuelguard_core::{JourneyId, PlateNumber, Timestamp};
use serde::{Deserialize, Serialize};

use crate::discrepancy::Severity;
use crate::error::LedgerResult;
use crate::journey::DerivedStatus;
use crate::ledger::JourneyLedger;
use crate::storage::ChainTail;

/// Live state of a journey at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyOverview {
    /// The journey.
    pub journey_id: JourneyId,
    /// Its plate.
    pub plate: PlateNumber,
    /// Driver identity.
    pub driver: String,
    /// Route start.
    pub origin: String,
    /// Route end.
    pub destination: String,
    /// Registration time.
    pub created_at: Timestamp,
    /// Status including the overdue projection.
    pub status: DerivedStatus,
    /// Number of checkpoints logged.
    pub checkpoints: u64,
    /// Where the last checkpoint was logged.
    pub last_location: Option<String>,
    /// Severity of the last discrepancy.
    pub latest_severity: Option<Severity>,
}

impl JourneyLedger {
    /// List journeys as seen at `now`, newest first.
    ///
    /// With `filter`, only journeys whose derived status matches are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn journey_overview(
        &self,
        now: &Timestamp,
        filter: Option<DerivedStatus>,
    ) -> LedgerResult<Vec<JourneyOverview>> {
        let threshold = self.settings().overdue_threshold;
        let mut rows = Vec::new();

        for journey in self.list_journeys()? {
            let status = journey.derived_status(now, threshold);
            if filter.is_some_and(|wanted| wanted != status) {
                continue;
            }
            let tail = self
                .storage()
                .get_tail(&journey.id)?
                .unwrap_or_else(|| ChainTail::genesis(&journey));
            rows.push(JourneyOverview {
                journey_id: journey.id,
                plate: journey.plate,
                driver: journey.driver,
                origin: journey.origin,
                destination: journey.destination,
                created_at: journey.created_at,
                status,
                checkpoints: tail.entries,
                last_location: tail.last_location,
                latest_severity: tail.last_severity,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewCheckpoint;
    use crate::journey::JourneyRegistration;
    use crate::ledger::JourneyRef;
    use chrono::{Duration, TimeZone, Utc};
    use fuelguard_core::{Clock, ManualClock};
    use std::sync::Arc;

    #[test]
    fn test_overview_projects_status() {
        let start = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap());
        let clock = Arc::new(ManualClock::new(start));
        let ledger = JourneyLedger::in_memory().with_clock(clock.clone());

        let old = ledger
            .register(JourneyRegistration::new("OLD 1", "A", "Mombasa", "Nairobi", 30000.0))
            .unwrap();
        clock.advance(Duration::hours(1));
        let done = ledger
            .register(JourneyRegistration::new("DONE 1", "B", "Mombasa", "Kisumu", 30000.0))
            .unwrap();
        ledger
            .append_checkpoint(
                &JourneyRef::Id(done.journey_id),
                NewCheckpoint::new("Kisumu", "Otieno", 28500.0),
            )
            .unwrap();
        clock.advance(Duration::hours(1));
        let fresh = ledger
            .register(JourneyRegistration::new("NEW 1", "C", "Mombasa", "Nairobi", 30000.0))
            .unwrap();

        clock.advance(Duration::hours(71));
        let rows = ledger.journey_overview(&clock.now(), None).unwrap();
        let ids: Vec<JourneyId> = rows.iter().map(|r| r.journey_id).collect();
        assert_eq!(ids, vec![fresh.journey_id, done.journey_id, old.journey_id]);

        assert_eq!(rows[0].status, DerivedStatus::InTransit);
        assert_eq!(rows[1].status, DerivedStatus::Completed);
        assert_eq!(rows[1].last_location.as_deref(), Some("Kisumu"));
        assert_eq!(rows[1].latest_severity, Some(Severity::CriticalLoss));
        assert_eq!(rows[1].checkpoints, 1);
        assert_eq!(rows[2].status, DerivedStatus::Overdue);
        assert_eq!(rows[2].latest_severity, None);

        let overdue = ledger
            .journey_overview(&clock.now(), Some(DerivedStatus::Overdue))
            .unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].plate.as_str(), "OLD 1");
    }
}
