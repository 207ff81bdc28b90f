use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::core::config::{Settings, SettingsWatcher};
use crate::core::values::{SysinfoProbe, ValueFetcher};
use crate::core::Dashboard;
use crate::platform::is_current_user_admin;
use crate::ui::html_to_text;

/// Render the configured template in the terminal, once or every interval
pub fn execute(matches: &clap::ArgMatches, config_path: &Path) -> Result<()> {
    let settings = Settings::load_from(config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;

    let once = matches.get_flag("once");
    let interval = matches
        .get_one::<u64>("interval")
        .copied()
        .unwrap_or(settings.refresh_interval_msec);
    let interval = Duration::from_millis(interval.max(crate::core::config::MIN_REFRESH_INTERVAL_MSEC));

    let fetcher = ValueFetcher::new(Box::new(SysinfoProbe::new()), is_current_user_admin());
    let mut dashboard = Dashboard::new(fetcher, &settings);

    if once {
        // Rates and CPU usage need a baseline sample to be meaningful
        dashboard.render_body();
        thread::sleep(interval);
        println!("{}", html_to_text(&dashboard.render_body()));
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    let mut watcher = SettingsWatcher::new(config_path.to_path_buf());
    println!("{}", "Press Ctrl+C to stop".dimmed());

    while running.load(Ordering::SeqCst) {
        if let Some(settings) = watcher.poll() {
            dashboard.load_settings(&settings);
        }

        let text = html_to_text(&dashboard.render_body());
        let stamp = chrono::Local::now().format("%H:%M:%S");
        println!("{}", format!("[{}]", stamp).dimmed());
        println!("{}", text);

        thread::sleep(interval);
    }

    Ok(())
}
