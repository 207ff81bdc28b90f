use std::rc::Rc;

use super::geometry::TaskbarGeometry;
use crate::platform::{ShellApi, WindowHandle};

pub const TASKBAR_CLASS: &str = "Shell_TrayWnd";
pub const TRAY_NOTIFY_CLASS: &str = "TrayNotifyWnd";

/// Used when the tray cannot be measured
pub const DEFAULT_TRAY_WIDTH: i32 = 150;
/// Anything at or above this is a transient shell state, not a real tray
pub const MAX_PLAUSIBLE_TRAY_WIDTH: i32 = 3000;

/// Desktop and shell windows that may cover the screen without being "fullscreen apps"
pub const SHELL_WINDOW_CLASSES: [&str; 4] = ["WorkerW", "Progman", "Shell_TrayWnd", "DV2ControlHost"];

/// Finds the taskbar and measures it through a [`ShellApi`]
pub struct TaskbarLocator<S: ShellApi + ?Sized> {
    shell: Rc<S>,
}

impl<S: ShellApi + ?Sized> TaskbarLocator<S> {
    pub fn new(shell: Rc<S>) -> Self {
        Self { shell }
    }

    pub fn shell(&self) -> &Rc<S> {
        &self.shell
    }

    /// The primary taskbar, if the shell has created it yet
    pub fn find_taskbar(&self) -> Option<WindowHandle> {
        self.shell.find_window(TASKBAR_CLASS)
    }

    /// Width of the notification area in physical pixels, or
    /// [`DEFAULT_TRAY_WIDTH`] if it is missing or reports a nonsense width
    pub fn tray_notify_width(&self, taskbar: WindowHandle) -> i32 {
        let width = self
            .shell
            .find_child_window(taskbar, TRAY_NOTIFY_CLASS)
            .and_then(|tray| self.shell.window_rect(tray))
            .map(|rect| rect.width());

        match width {
            Some(w) if w > 0 && w < MAX_PLAUSIBLE_TRAY_WIDTH => w,
            other => {
                log::trace!("Tray width {:?} unusable, assuming {}", other, DEFAULT_TRAY_WIDTH);
                DEFAULT_TRAY_WIDTH
            }
        }
    }

    /// Whether a fullscreen application currently owns the screen.
    ///
    /// A hidden taskbar counts as fullscreen. Otherwise the foreground window
    /// must cover the whole primary screen and not be one of
    /// [`SHELL_WINDOW_CLASSES`], so showing the desktop does not hide the overlay.
    pub fn is_fullscreen_active(&self, taskbar: WindowHandle) -> bool {
        if !self.shell.is_window_visible(taskbar) {
            return true;
        }

        let Some(foreground) = self.shell.foreground_window() else {
            return false;
        };

        if let Some(class_name) = self.shell.class_name(foreground) {
            if SHELL_WINDOW_CLASSES.contains(&class_name.as_str()) {
                return false;
            }
        }

        let Some(rect) = self.shell.window_rect(foreground) else {
            return false;
        };
        let (screen_width, screen_height) = self.shell.screen_size();

        rect.width() >= screen_width && rect.height() >= screen_height
    }

    /// Taskbar rectangle and tray width for this tick
    pub fn geometry(&self, taskbar: WindowHandle) -> Option<TaskbarGeometry> {
        let rect = self.shell.window_rect(taskbar)?;
        Some(TaskbarGeometry {
            taskbar,
            rect,
            tray_width: self.tray_notify_width(taskbar),
        })
    }
}
