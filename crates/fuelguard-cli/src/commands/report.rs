//! Report command - print a verifiable journey record.

use colored::Colorize;
use fuelguard_ledger::{DerivedStatus, JourneyLedger, JourneyRef, JourneyReport};

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// Assemble and print the report for a journey in any status.
pub(crate) fn report(
    ledger: &JourneyLedger,
    journey: &JourneyRef,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = ledger.report(journey)?;
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Pretty => {
            let status = report
                .journey
                .derived_status(&ledger.now(), ledger.settings().overdue_threshold);
            print_report(&report, status)
        },
    }
}

fn print_report(report: &JourneyReport, status: DerivedStatus) -> anyhow::Result<()> {
    let journey = &report.journey;

    println!("\n{}", Theme::header("Fuel Transport Journey Report"));
    println!("{}", Theme::separator());
    println!("{}", Theme::kv("Journey", &journey.id.to_string()));
    println!("{}", Theme::kv("Plate", journey.plate.as_str()));
    println!("{}", Theme::kv("Driver", &journey.driver));
    println!(
        "{}",
        Theme::kv("Route", &format!("{} → {}", journey.origin, journey.destination))
    );
    println!("{}", Theme::kv("Registered", &Theme::timestamp(&journey.created_at)));
    println!("{}", Theme::kv("Initial fuel", &Theme::liters(journey.initial_fuel)));
    println!("{}", Theme::kv("Status", &Theme::status(status)));
    println!("{}", Theme::kv("Genesis", &Theme::hash(&report.genesis_display())));

    println!("\n{}", Theme::header("Checkpoints"));
    if report.entries.is_empty() {
        println!("{}", Theme::info("No checkpoints logged"));
    } else {
        println!(
            "{:>3} {:<17} {:<16} {:<14} {:>11} {:>10} {:<18} {}",
            "#".dimmed(),
            "TIME".dimmed(),
            "LOCATION".dimmed(),
            "OFFICER".dimmed(),
            "READING".dimmed(),
            "DELTA".dimmed(),
            "SEVERITY".dimmed(),
            "SIGNATURE".dimmed()
        );
        println!("{}", Theme::separator());
        for (index, line) in report.entries.iter().enumerate() {
            let entry = &line.entry;
            println!(
                "{:>3} {:<17} {:<16} {:<14} {:>11} {:>+10.1} {:<18} {}",
                index,
                Theme::timestamp(&entry.timestamp),
                entry.location,
                entry.officer,
                Theme::liters(entry.fuel_reading),
                line.discrepancy.delta,
                Theme::severity(line.discrepancy.severity),
                Theme::hash(&line.signature_display())
            );
            if let Some(notes) = &entry.notes {
                println!("    {}", Theme::dimmed(&format!("notes: {notes}")));
            }
            if let Some(evidence) = &entry.evidence {
                println!("    {}", Theme::dimmed(&format!("evidence: {}", evidence.as_str())));
            }
        }
    }

    println!("\n{}", Theme::header("Integrity"));
    let verification = &report.verification;
    if verification.valid {
        println!(
            "{}",
            Theme::success(&format!(
                "Chain intact ({} checkpoints verified)",
                verification.entries_verified
            ))
        );
    } else {
        let index = verification
            .broken_at_index
            .map_or_else(|| "?".to_string(), |i| i.to_string());
        println!("{}", Theme::error(&format!("Chain broken at checkpoint #{index}")));
        if let Some(issue) = &verification.issue {
            println!("    {}", Theme::dimmed(&issue.to_string()));
        }
    }
    println!("{}", Theme::kv("Final hash", &Theme::hash(&report.final_display())));
    println!(
        "{}",
        Theme::kv("Verify code", &report.verification_code.to_payload()?)
    );
    println!();
    Ok(())
}
