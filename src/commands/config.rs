use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::core::config::Settings;

pub fn execute(matches: &clap::ArgMatches, config_path: &Path) -> Result<()> {
    match matches.subcommand() {
        Some(("path", _)) => show_path(config_path),
        Some(("show", _)) => show(config_path),
        Some(("init", sub_matches)) => init(config_path, sub_matches.get_flag("force")),
        Some(("reset", _)) => reset(config_path),
        _ => {
            println!("Use 'obidome config --help' for more information.");
            Ok(())
        }
    }
}

fn show_path(config_path: &Path) -> Result<()> {
    println!("{}", config_path.display());
    if !config_path.exists() {
        println!("{}", "(file does not exist yet, defaults are in use)".dimmed());
    }
    Ok(())
}

/// Effective settings, i.e. the file merged over the defaults
fn show(config_path: &Path) -> Result<()> {
    let settings = Settings::load_from(config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    let json = serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
    println!("{}", json);
    Ok(())
}

fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        println!(
            "{}",
            format!("Settings file already exists: {}", config_path.display()).yellow()
        );
        println!("{}", "Use --force to overwrite it with the defaults.".dimmed());
        return Ok(());
    }

    write_defaults(config_path)?;
    println!(
        "{} {}",
        "✓ Wrote default settings to".green(),
        config_path.display()
    );
    Ok(())
}

fn reset(config_path: &Path) -> Result<()> {
    write_defaults(config_path)?;
    println!(
        "{} {}",
        "✓ Settings reset to defaults:".green(),
        config_path.display()
    );
    Ok(())
}

fn write_defaults(config_path: &Path) -> Result<()> {
    Settings::default()
        .save_to(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
