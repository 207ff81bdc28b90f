use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::{Settings, SettingsWatcher};
use crate::core::dashboard::Dashboard;
use crate::core::taskbar::{EmbeddingController, OverlaySurface, TickOutcome};
use crate::platform::ShellApi;

/// Entries of the widget's context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    OpenSettings,
    Quit,
}

impl MenuCommand {
    /// Menu order
    pub const ALL: [MenuCommand; 2] = [MenuCommand::OpenSettings, MenuCommand::Quit];

    /// Command id; 0 means nothing was picked
    pub fn id(self) -> u16 {
        match self {
            MenuCommand::OpenSettings => 1,
            MenuCommand::Quit => 2,
        }
    }

    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuCommand::OpenSettings => "Open settings file",
            MenuCommand::Quit => "Quit",
        }
    }
}

/// What the UI layer has to do after the menu closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Nothing,
    /// Show this file in the user's editor
    OpenFile(PathBuf),
    Quit,
}

/// Everything one timer tick touches: settings reload, the dashboard and the
/// embedding controller. Owned by the UI thread.
pub struct WidgetApp<S: ShellApi + ?Sized, O: OverlaySurface> {
    controller: EmbeddingController<S, O>,
    dashboard: Dashboard,
    watcher: Option<SettingsWatcher>,
}

impl<S: ShellApi + ?Sized, O: OverlaySurface> WidgetApp<S, O> {
    pub fn new(
        mut controller: EmbeddingController<S, O>,
        dashboard: Dashboard,
        settings: &Settings,
    ) -> Self {
        controller.load_settings(settings);
        Self {
            controller,
            dashboard,
            watcher: None,
        }
    }

    /// Reload settings whenever the watched file changes
    pub fn with_watcher(mut self, watcher: SettingsWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.controller.load_settings(settings);
        self.dashboard.load_settings(settings);
    }

    /// Run one tick and return the delay until the next one
    pub fn on_timer(&mut self) -> Duration {
        if let Some(settings) = self.watcher.as_mut().and_then(SettingsWatcher::poll) {
            self.apply_settings(&settings);
        }

        match self.controller.tick(&mut self.dashboard) {
            TickOutcome::Detached | TickOutcome::Hidden => {}
            outcome => log::trace!("Tick: {:?}", outcome),
        }

        self.controller.next_timer_delay()
    }

    /// Ticks keep rendering while the menu is open, but the overlay stays put
    pub fn menu_opened(&mut self) {
        self.controller.hold();
    }

    pub fn menu_closed(&mut self, choice: Option<MenuCommand>) -> MenuAction {
        self.controller.release();

        match choice {
            None => MenuAction::Nothing,
            Some(MenuCommand::Quit) => {
                log::info!("Quit requested from the menu");
                MenuAction::Quit
            }
            Some(MenuCommand::OpenSettings) => match self.settings_file() {
                Some(path) => MenuAction::OpenFile(path),
                None => MenuAction::Nothing,
            },
        }
    }

    /// The watched settings file, written with defaults first if it does not exist yet
    fn settings_file(&self) -> Option<PathBuf> {
        let Some(path) = self.watcher.as_ref().map(|w| w.path().to_path_buf()) else {
            log::warn!("No settings file is being watched");
            return None;
        };

        if !path.exists() {
            if let Err(e) = Settings::default().save_to(&path) {
                log::warn!("Failed to create {}: {}", path.display(), e);
                return None;
            }
            log::info!("Created default settings at {}", path.display());
        }
        Some(path)
    }

    pub fn controller(&self) -> &EmbeddingController<S, O> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut EmbeddingController<S, O> {
        &mut self.controller
    }
}
