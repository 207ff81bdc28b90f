use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::core::config::Settings;
use crate::core::values::{MetricValue, SysinfoProbe, ValueFetcher};
use crate::platform::is_current_user_admin;

/// Gap between the baseline sample and the one that is printed
const SAMPLE_GAP: Duration = Duration::from_millis(500);
/// Data URIs are long; only their head is shown
const MAX_VALUE_CHARS: usize = 48;

/// Print metric keys with their current values
pub fn execute(matches: &clap::ArgMatches, config_path: &Path) -> Result<()> {
    let settings = Settings::load_from(config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;

    let mut fetcher = ValueFetcher::new(Box::new(SysinfoProbe::new()), is_current_user_admin());
    fetcher.load_settings(&settings);

    let keys: Vec<String> = match matches.get_many::<String>("keys") {
        Some(keys) => keys.cloned().collect(),
        None => fetcher.keys(),
    };

    // Prime rates and CPU usage, then read everything from one fresh cycle
    for key in &keys {
        fetcher.get(key);
    }
    thread::sleep(SAMPLE_GAP);
    fetcher.clear_cache();

    let width = keys.iter().map(String::len).max().unwrap_or(0);

    for key in &keys {
        let value = fetcher.get(key);
        let shown = shorten(&display(&value));
        let shown = if value.is_unavailable() {
            shown.yellow()
        } else {
            shown.white()
        };
        let label = format!("{:<width$}", key, width = width);
        println!("{}  {}", label.cyan(), shown);
    }

    Ok(())
}

fn display(value: &MetricValue) -> String {
    match value {
        MetricValue::Float(v) => format!("{:.2}", v),
        other => other.to_string(),
    }
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= MAX_VALUE_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_VALUE_CHARS).collect();
    format!("{}...", head)
}
