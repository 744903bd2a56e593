//! Config command - inspect the resolved configuration.

use fuelguard_config::{ResolvedConfig, ShowFormat};

use crate::theme::Theme;

/// Print the resolved configuration with the layer that set each value.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: ShowFormat,
    section: Option<&str>,
) -> anyhow::Result<()> {
    let output = resolved.show(format, section).map_err(|_| match section {
        Some(name) => anyhow::anyhow!("unknown config section '{name}'"),
        None => anyhow::anyhow!("failed to render configuration"),
    })?;
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
    Ok(())
}

/// Print the files consulted during loading.
pub(crate) fn show_paths(resolved: &ResolvedConfig, explicit: Option<&std::path::Path>) {
    println!("{}", Theme::header("Configuration files (lowest to highest priority)"));
    println!("  1. {}", Theme::dimmed("<embedded defaults>"));
    println!("  2. {}", resolved.home.join("config.toml").display());
    match explicit {
        Some(path) => println!("  3. {}", path.display()),
        None => println!("  3. {}", Theme::dimmed("--config <file> (not given)")),
    }
    println!("  4. {}", Theme::dimmed("FUELGUARD_* environment variables"));
    if let Some(path) = &resolved.config.storage.path {
        println!(
            "\n{}",
            Theme::kv(&format!("Ledger ({})", resolved.config.storage.backend), path)
        );
    }
}
