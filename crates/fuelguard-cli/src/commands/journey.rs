//! Journey commands - register journeys and watch the route monitor.

use colored::Colorize;
use fuelguard_ledger::{DerivedStatus, JourneyLedger, JourneyRef, JourneyRegistration};

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// Open a new journey and print its genesis hash.
pub(crate) fn register(
    ledger: &JourneyLedger,
    registration: JourneyRegistration,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let created = ledger.register(registration)?;

    if format == OutputFormat::Json {
        return print_json(&created);
    }

    let journey = ledger.journey(&JourneyRef::Id(created.journey_id))?;
    println!("{}", Theme::success("Journey registered"));
    println!("{}", Theme::kv("Journey", &created.journey_id.to_string()));
    println!("{}", Theme::kv("Plate", journey.plate.as_str()));
    println!(
        "{}",
        Theme::kv(
            "Route",
            &format!("{} → {}", journey.origin, journey.destination)
        )
    );
    println!("{}", Theme::kv("Initial fuel", &Theme::liters(journey.initial_fuel)));
    println!("{}", Theme::kv("Genesis", &Theme::hash(&created.genesis_hash.to_hex())));
    Ok(())
}

/// List journeys with their live status, newest first.
pub(crate) fn list(
    ledger: &JourneyLedger,
    status: Option<DerivedStatus>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rows = ledger.journey_overview(&ledger.now(), status)?;

    if format == OutputFormat::Json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("{}", Theme::info("No journeys"));
        return Ok(());
    }

    println!("\n{}", Theme::header("Journeys"));
    println!(
        "{:<12} {:<24} {:<12} {:>4} {:<18} {}",
        "PLATE".dimmed(),
        "ROUTE".dimmed(),
        "STATUS".dimmed(),
        "CPS".dimmed(),
        "LAST SEEN".dimmed(),
        "LATEST".dimmed()
    );
    println!("{}", Theme::separator());

    for row in rows {
        let route = format!("{} → {}", row.origin, row.destination);
        let last_seen = row.last_location.as_deref().unwrap_or("-");
        let latest = row
            .latest_severity
            .map_or_else(|| Theme::dimmed("-"), Theme::severity);
        println!(
            "{:<12} {:<24} {:<12} {:>4} {:<18} {}",
            row.plate.as_str(),
            route,
            Theme::status(row.status),
            row.checkpoints,
            last_seen,
            latest
        );
    }

    println!();
    Ok(())
}
