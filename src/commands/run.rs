use anyhow::Result;
use std::path::Path;

/// Embed the widget into the taskbar and run until Quit from the tray menu or Ctrl+C
#[cfg(windows)]
pub fn execute(config_path: &Path) -> Result<()> {
    use anyhow::Context;
    use std::rc::Rc;

    use crate::core::config::{Settings, SettingsWatcher};
    use crate::core::taskbar::EmbeddingController;
    use crate::core::values::{SysinfoProbe, ValueFetcher};
    use crate::core::{Dashboard, WidgetApp};
    use crate::platform::{is_current_user_admin, Win32Shell};
    use crate::ui::overlay_win32::{enable_dpi_awareness, Win32Overlay};

    let settings = Settings::load_from(config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    log::info!("Using settings file {}", config_path.display());

    enable_dpi_awareness();
    let overlay = Win32Overlay::create().context("Failed to create overlay window")?;
    let controller = EmbeddingController::new(Rc::new(Win32Shell::new()), overlay);

    let fetcher = ValueFetcher::new(Box::new(SysinfoProbe::new()), is_current_user_admin());
    let dashboard = Dashboard::new(fetcher, &settings);

    let app = WidgetApp::new(controller, dashboard, &settings)
        .with_watcher(SettingsWatcher::new(config_path.to_path_buf()));

    let first_delay = app.controller().next_timer_delay();
    crate::ui::tray_win32::run(Box::new(app), first_delay)
}

#[cfg(not(windows))]
pub fn execute(_config_path: &Path) -> Result<()> {
    Err(crate::error::ObidomeError::unsupported(
        "taskbar embedding needs the Windows shell; try 'obidome print' instead",
    )
    .into())
}
