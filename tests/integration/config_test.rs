use std::fs;
use std::thread;
use std::time::Duration;

use obidome::core::config::{Settings, SettingsWatcher, MIN_REFRESH_INTERVAL_MSEC};
use obidome::core::sparkline::FillStyle;
use tempfile::TempDir;

#[test]
fn test_save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("settings.json");

    let mut settings = Settings::default();
    settings.margin_right = 42;
    settings.ram_percent_plot_settings.fill_style = FillStyle::None;
    settings
        .custom_metrics
        .insert("uptime".to_string(), "uptime -p".to_string());
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_fill_style_is_lowercase_in_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{"cpu_percent_plot_settings": {"fill_style": "solid", "min_value": null, "max_value": null}}"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.cpu_percent_plot_settings.fill_style, FillStyle::Solid);
    assert_eq!(settings.cpu_percent_plot_settings.min_value, None);
    // untouched fields keep their defaults
    assert_eq!(settings.cpu_percent_plot_settings.buffer_len, 30);
}

#[test]
fn test_tiny_interval_is_clamped_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, r#"{"refresh_interval_msec": 1}"#).unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.refresh_interval_msec, MIN_REFRESH_INTERVAL_MSEC);
}

#[test]
fn test_watcher_reports_changes_once() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    Settings::default().save_to(&path).unwrap();

    let mut watcher = SettingsWatcher::new(path.clone());
    assert!(watcher.poll().is_none());

    // Some filesystems only keep whole-second modification times
    thread::sleep(Duration::from_millis(1100));
    fs::write(&path, r#"{"margin_right": 3}"#).unwrap();

    let reloaded = watcher.poll().expect("change detected");
    assert_eq!(reloaded.margin_right, 3);
    assert!(watcher.poll().is_none());
}

#[test]
fn test_watcher_handles_file_creation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");

    let mut watcher = SettingsWatcher::new(path.clone());
    assert!(watcher.poll().is_none());

    fs::write(&path, r#"{"refresh_interval_msec": 2000}"#).unwrap();
    let reloaded = watcher.poll().expect("new file detected");
    assert_eq!(reloaded.refresh_interval_msec, 2000);
}
