//! Checkpoint command - log a fuel reading onto a journey's chain.

use std::io::IsTerminal;

use anyhow::bail;
use fuelguard_ledger::{JourneyLedger, JourneyRef, JourneyStatus, NewCheckpoint};
use tracing::info;

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// Preview the reading, confirm it if the policy asks for that, then append.
///
/// `confirmed` skips the prompt. Without a terminal an unconfirmed reading
/// that needs confirmation is refused.
pub(crate) fn log_checkpoint(
    ledger: &JourneyLedger,
    journey: &JourneyRef,
    checkpoint: NewCheckpoint,
    confirmed: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let preview = ledger.preview_checkpoint(journey, checkpoint.fuel_reading)?;
    let discrepancy = preview.discrepancy;

    if preview.requires_confirmation && !confirmed {
        let summary = format!(
            "Reading {} against {} ({}, delta {:+.1} L)",
            Theme::liters(discrepancy.current_reading),
            Theme::liters(discrepancy.previous_reading),
            discrepancy.severity.label(),
            discrepancy.delta
        );
        if !std::io::stdin().is_terminal() {
            bail!("{summary} needs confirmation; re-run with --yes to record it");
        }
        println!("{}", Theme::warning(&summary));
        let accept = dialoguer::Confirm::new()
            .with_prompt("Record this reading?")
            .default(false)
            .interact()?;
        if !accept {
            println!("{}", Theme::info("Aborted. Nothing was recorded."));
            return Ok(());
        }
        info!(journey_id = %preview.journey_id, delta = discrepancy.delta, "Reading confirmed");
    }

    let outcome = ledger.append_checkpoint(&JourneyRef::Id(preview.journey_id), checkpoint)?;

    if format == OutputFormat::Json {
        return print_json(&outcome);
    }

    let entry = &outcome.entry;
    println!(
        "{}",
        Theme::success(&format!("Checkpoint #{} logged at {}", entry.sequence, entry.location))
    );
    println!("{}", Theme::kv("Reading", &Theme::liters(entry.fuel_reading)));
    println!(
        "{}",
        Theme::kv(
            "Delta",
            &format!(
                "{:+.1} L  {}",
                outcome.discrepancy.delta,
                Theme::severity(outcome.discrepancy.severity)
            )
        )
    );
    println!("{}", Theme::kv("Previous", &Theme::hash(&entry.previous_hash.abbreviated())));
    println!("{}", Theme::kv("Signature", &Theme::hash(&entry.signature_hash.to_hex())));
    if outcome.status == JourneyStatus::Completed {
        println!("{}", Theme::success("Destination reached, journey completed"));
    }
    Ok(())
}
