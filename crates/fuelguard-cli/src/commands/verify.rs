//! Verify command - recompute hash chains and report the first break.

use anyhow::bail;
use fuelguard_ledger::{JourneyLedger, JourneyRef, VerificationResult};

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// Verify one journey, or every journey when `journey` is `None`.
///
/// Fails (non-zero exit) when any chain is broken.
pub(crate) fn verify(
    ledger: &JourneyLedger,
    journey: Option<&JourneyRef>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let results = match journey {
        Some(journey) => vec![ledger.verify(journey)?],
        None => ledger.verify_all()?,
    };

    if format == OutputFormat::Json {
        print_json(&results)?;
    } else {
        print_results(&results);
    }

    let broken = results.iter().filter(|r| !r.valid).count();
    if broken > 0 {
        bail!("{broken} of {} chains failed verification", results.len());
    }
    Ok(())
}

fn print_results(results: &[VerificationResult]) {
    if results.is_empty() {
        println!("{}", Theme::info("No journeys to verify"));
        return;
    }

    for result in results {
        let id = result.journey_id.to_string();
        match (result.broken_at_index, &result.issue) {
            (Some(index), issue) => {
                println!(
                    "{}",
                    Theme::error(&format!("{id}: chain broken at checkpoint #{index}"))
                );
                if let Some(issue) = issue {
                    println!("    {}", Theme::dimmed(&issue.to_string()));
                }
            },
            (None, _) => println!(
                "{}",
                Theme::success(&format!(
                    "{id}: {} checkpoints verified",
                    result.entries_verified
                ))
            ),
        }
    }

    let valid = results.iter().filter(|r| r.valid).count();
    if valid == results.len() && results.len() > 1 {
        println!("{}", Theme::success(&format!("All {valid} journeys verified")));
    } else if valid < results.len() {
        println!(
            "{}",
            Theme::warning(&format!("{valid}/{} journeys intact", results.len()))
        );
    }
}
