use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::sparkline::SparklineSettings;
use crate::error::{ObidomeError, Result};

/// Environment variable that points at an alternative settings file
pub const CONFIG_ENV_VAR: &str = "OBIDOME_CONFIG";

pub const DEFAULT_REFRESH_INTERVAL_MSEC: u64 = 1000;
pub const MIN_REFRESH_INTERVAL_MSEC: u64 = 100;
pub const DEFAULT_MARGIN_RIGHT: i32 = 10;

const DEFAULT_CONTAINER_STYLESHEET: &str =
    "font-family: 'Consolas', 'monospace';\nfont-size: 14px;\npadding: 0px;\n";

const DEFAULT_INFO_LABEL: &str = r#"<table width="100%" cellspacing="0" cellpadding="0">
    <tr>
        <td align="right" style="color: #aaaaaa; padding-right: 4px;">CPU:</td>
        <td align="left" style="color: #ffffff; white-space: pre;">{cpu_percent:4.1f}<span style="font-size:9px">%</span></td>
    </tr>
    <tr>
        <td align="right" style="color: #aaaaaa; padding-right: 4px;">RAM:</td>
        <td align="left" style="color: #ffffff; white-space: pre;">{ram_percent:4.1f}<span style="font-size:9px">%</span></td>
    </tr>
</table>
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Refresh interval in milliseconds
    pub refresh_interval_msec: u64,
    /// Gap between the overlay and the tray icons, in logical pixels
    pub margin_right: i32,
    /// Inline style of the element wrapping the rendered template
    pub container_stylesheet: String,
    /// Display template with `{metric:spec}` placeholders
    pub info_label: String,
    pub cpu_percent_plot_settings: SparklineSettings,
    pub ram_percent_plot_settings: SparklineSettings,
    /// Metric key -> shell command whose trimmed stdout becomes the value
    pub custom_metrics: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_msec: DEFAULT_REFRESH_INTERVAL_MSEC,
            margin_right: DEFAULT_MARGIN_RIGHT,
            container_stylesheet: DEFAULT_CONTAINER_STYLESHEET.to_string(),
            info_label: DEFAULT_INFO_LABEL.to_string(),
            cpu_percent_plot_settings: SparklineSettings::default(),
            ram_percent_plot_settings: SparklineSettings {
                line_color: "#00aaff".to_string(),
                fill_color: "#00aaff".to_string(),
                ..SparklineSettings::default()
            },
            custom_metrics: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load from the default location (or `OBIDOME_CONFIG`)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`.
    ///
    /// A missing file yields the defaults. An empty or unreadable document also
    /// yields the defaults, with a warning, so a bad edit never stops the widget.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let data = fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings = match serde_json::from_str::<Settings>(&data) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!(
                    "Ignoring malformed settings file {}: {}",
                    path.display(),
                    e
                );
                Settings::default()
            }
        };

        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| ObidomeError::config("Could not determine config directory"))?;

        Ok(config_dir.join("obidome").join("settings.json"))
    }

    /// Clamp values that would make the widget misbehave
    pub fn sanitized(mut self) -> Self {
        if self.refresh_interval_msec < MIN_REFRESH_INTERVAL_MSEC {
            log::warn!(
                "refresh_interval_msec {} is too small, using {}",
                self.refresh_interval_msec,
                MIN_REFRESH_INTERVAL_MSEC
            );
            self.refresh_interval_msec = MIN_REFRESH_INTERVAL_MSEC;
        }
        self
    }

    /// Sparkline settings for a plot metric key
    pub fn plot_settings(&self, plot_key: &str) -> Option<&SparklineSettings> {
        match plot_key {
            "cpu_percent_plot" => Some(&self.cpu_percent_plot_settings),
            "ram_percent_plot" => Some(&self.ram_percent_plot_settings),
            _ => None,
        }
    }
}

/// Detects edits to the settings file between ticks
#[derive(Debug)]
pub struct SettingsWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl SettingsWatcher {
    pub fn new(path: PathBuf) -> Self {
        let last_modified = modified_time(&path);
        Self {
            path,
            last_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload if the file's modification time changed since the last poll
    pub fn poll(&mut self) -> Option<Settings> {
        let modified = modified_time(&self.path);
        if modified == self.last_modified {
            return None;
        }
        self.last_modified = modified;

        match Settings::load_from(&self.path) {
            Ok(settings) => {
                log::info!("Settings file changed, reloading {}", self.path.display());
                Some(settings)
            }
            Err(e) => {
                log::warn!("Failed to reload settings from {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
