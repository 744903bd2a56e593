//! Fuelguard CLI - tamper-evident checkpoint ledger for fuel transport.
//!
//! Checkpoint officers log fuel readings onto a per-journey hash chain;
//! auditors verify chains and print journey reports.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fuelguard_config::{Config, ShowFormat};
use fuelguard_ledger::{DerivedStatus, JourneyRef, JourneyRegistration, NewCheckpoint};
use fuelguard_telemetry::{OperationContext, OperationGuard};

mod commands;
mod config_bridge;
mod theme;

use commands::{OutputFormat, checkpoint, config, journey, report, verify};
use theme::Theme;

/// Fuelguard - tamper-evident fuel checkpoint ledger
#[derive(Parser)]
#[command(name = "fuelguard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Extra configuration file, applied over ~/.fuelguard/config.toml
    #[arg(short, long, global = true, env = "FUELGUARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a journey for a truck
    Register {
        /// Registration plate
        #[arg(long)]
        plate: String,
        /// Driver identity
        #[arg(long)]
        driver: String,
        /// Route start
        #[arg(long)]
        origin: String,
        /// Route end; a checkpoint logged here completes the journey
        #[arg(long)]
        destination: String,
        /// Fuel volume at departure, liters
        #[arg(long)]
        initial_fuel: f64,
    },

    /// Log a checkpoint reading on a journey in transit
    Checkpoint {
        /// Journey id or plate
        journey: JourneyRef,
        /// Where the reading was taken
        #[arg(long)]
        location: String,
        /// Officer on duty
        #[arg(long)]
        officer: String,
        /// Fuel volume read, liters
        #[arg(long)]
        fuel: f64,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Reference to stored evidence media
        #[arg(long)]
        evidence: Option<String>,
        /// Record a reading outside the confirmation bounds without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Verify hash chains; every journey unless one is given
    Verify {
        /// Journey id or plate
        journey: Option<JourneyRef>,
    },

    /// Print a journey report
    Report {
        /// Journey id or plate
        journey: JourneyRef,
    },

    /// List journeys with their live status
    Journeys {
        /// Only journeys in this status (in_transit, completed, overdue)
        #[arg(long)]
        status: Option<DerivedStatus>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Show only a specific section (ledger, storage, logging)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Show the files consulted while loading
    Paths,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Checkpoint { .. } => "checkpoint",
            Self::Verify { .. } => "verify",
            Self::Report { .. } => "report",
            Self::Journeys { .. } => "journeys",
            Self::Config { .. } => "config",
        }
    }

    fn subject(&self) -> Option<String> {
        match self {
            Self::Register { plate, .. } => Some(plate.clone()),
            Self::Checkpoint { journey, .. } | Self::Report { journey } => Some(journey.to_string()),
            Self::Verify { journey } => journey.as_ref().map(ToString::to_string),
            Self::Journeys { .. } | Self::Config { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let mut log_config = config_bridge::to_log_config(&resolved.config);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = fuelguard_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let mut context = OperationContext::new(cli.command.name());
    if let Some(subject) = cli.command.subject() {
        context = context.with_subject(subject);
    }
    let _guard = OperationGuard::new(context);

    if let Commands::Config { command } = &cli.command {
        let show_format = match cli.format {
            OutputFormat::Json => ShowFormat::Json,
            OutputFormat::Pretty => ShowFormat::Toml,
        };
        return match command {
            ConfigCommands::Show { section } => {
                config::show_config(&resolved, show_format, section.as_deref())
            },
            ConfigCommands::Paths => {
                config::show_paths(&resolved, cli.config.as_deref());
                Ok(())
            },
        };
    }

    let ledger = config_bridge::open_ledger(&resolved.config)?;
    let format = cli.format;

    let result = match cli.command {
        Commands::Register {
            plate,
            driver,
            origin,
            destination,
            initial_fuel,
        } => journey::register(
            &ledger,
            JourneyRegistration::new(plate, driver, origin, destination, initial_fuel),
            format,
        ),
        Commands::Checkpoint {
            journey,
            location,
            officer,
            fuel,
            notes,
            evidence,
            yes,
        } => {
            let mut submission = NewCheckpoint::new(location, officer, fuel);
            submission.notes = notes;
            submission.evidence = evidence;
            checkpoint::log_checkpoint(&ledger, &journey, submission, yes, format)
        },
        Commands::Verify { journey } => verify::verify(&ledger, journey.as_ref(), format),
        Commands::Report { journey } => report::report(&ledger, &journey, format),
        Commands::Journeys { status } => journey::list(&ledger, status, format),
        Commands::Config { .. } => Ok(()),
    };

    if let Err(e) = &result {
        tracing::debug!(error = %e, "Command failed");
        if format == OutputFormat::Pretty {
            eprintln!("{}", Theme::error(&format!("{e:#}")));
            std::process::exit(1);
        }
    }
    result
}
