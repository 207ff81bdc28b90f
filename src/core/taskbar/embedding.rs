use std::rc::Rc;
use std::time::Duration;

use super::geometry::{compute_placement, Placement};
use super::locator::TaskbarLocator;
use crate::core::config::{Settings, DEFAULT_MARGIN_RIGHT, DEFAULT_REFRESH_INTERVAL_MSEC};
use crate::error::Result;
use crate::platform::{ShellApi, WindowHandle, OVERLAY_EX_STYLE};

/// Delay before the very first attach attempt
pub const FIRST_ATTACH_DELAY: Duration = Duration::from_millis(100);
/// Delay between attach attempts while the taskbar is missing
pub const ATTACH_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// The window the widget draws into
pub trait OverlaySurface {
    fn handle(&self) -> WindowHandle;

    /// Device pixel ratio of the monitor the overlay is on
    fn scale_factor(&self) -> f64;

    /// Width in logical pixels the current content needs
    fn preferred_width(&self) -> i32;

    /// Replace the displayed content. An empty string blanks the overlay.
    fn set_content(&mut self, content: &str);
}

/// Produces the overlay content for one tick
pub trait ContentSource {
    fn render(&mut self) -> String;
}

impl<F: FnMut() -> String> ContentSource for F {
    fn render(&mut self) -> String {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingState {
    /// No attach attempt made yet
    Unattached,
    /// Taskbar not found so far
    Retrying { attempts: u32 },
    /// Owned by the taskbar and updating every tick
    Running { taskbar: WindowHandle },
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Taskbar still missing, overlay left blank
    Detached,
    /// Fullscreen app in front, content blanked and position kept
    Hidden,
    /// Content updated, repositioning suspended by [`EmbeddingController::hold`]
    Held,
    /// Content updated, but the taskbar could not be measured or moved to
    Rendered,
    /// Content updated and the overlay moved
    Positioned(Placement),
}

/// Attaches the overlay to the taskbar and keeps it next to the tray.
///
/// Driven by a single timer: call [`tick`](Self::tick) whenever it fires, then
/// re-arm it with [`next_timer_delay`](Self::next_timer_delay).
pub struct EmbeddingController<S: ShellApi + ?Sized, O: OverlaySurface> {
    locator: TaskbarLocator<S>,
    overlay: O,
    state: EmbeddingState,
    held: bool,
    margin_right: i32,
    refresh_interval: Duration,
}

impl<S: ShellApi + ?Sized, O: OverlaySurface> EmbeddingController<S, O> {
    pub fn new(shell: Rc<S>, overlay: O) -> Self {
        Self {
            locator: TaskbarLocator::new(shell),
            overlay,
            state: EmbeddingState::Unattached,
            held: false,
            margin_right: DEFAULT_MARGIN_RIGHT,
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MSEC),
        }
    }

    pub fn load_settings(&mut self, settings: &Settings) {
        self.margin_right = settings.margin_right;
        self.refresh_interval = Duration::from_millis(settings.refresh_interval_msec);
    }

    pub fn state(&self) -> EmbeddingState {
        self.state
    }

    pub fn locator(&self) -> &TaskbarLocator<S> {
        &self.locator
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    /// Suspend repositioning, e.g. while a menu anchored to the overlay is open
    pub fn hold(&mut self) {
        self.held = true;
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// How long to wait before the next [`tick`](Self::tick)
    pub fn next_timer_delay(&self) -> Duration {
        match self.state {
            EmbeddingState::Unattached => FIRST_ATTACH_DELAY,
            EmbeddingState::Retrying { .. } => ATTACH_RETRY_DELAY,
            EmbeddingState::Running { .. } => self.refresh_interval,
        }
    }

    /// Find the taskbar and make it the overlay's owner.
    ///
    /// Returns whether the controller is attached afterwards. Failure to find
    /// the taskbar is expected right after login and only moves the controller
    /// into the retrying state.
    pub fn try_attach(&mut self) -> bool {
        if let EmbeddingState::Running { .. } = self.state {
            return true;
        }

        let Some(taskbar) = self.locator.find_taskbar() else {
            let attempts = match self.state {
                EmbeddingState::Retrying { attempts } => attempts + 1,
                _ => 1,
            };
            log::warn!("Failed to find taskbar window. Retrying in 1 second...");
            self.state = EmbeddingState::Retrying { attempts };
            return false;
        };

        if let Err(e) = self.attach_to(taskbar) {
            log::warn!("Failed to attach overlay to taskbar: {}", e);
            let attempts = match self.state {
                EmbeddingState::Retrying { attempts } => attempts + 1,
                _ => 1,
            };
            self.state = EmbeddingState::Retrying { attempts };
            return false;
        }

        log::info!("Attached overlay to taskbar {:#x}", taskbar.0);
        self.state = EmbeddingState::Running { taskbar };
        true
    }

    fn attach_to(&self, taskbar: WindowHandle) -> Result<()> {
        let shell = self.locator.shell();
        let hwnd = self.overlay.handle();

        shell.set_owner(hwnd, taskbar)?;
        let style = shell.ex_style(hwnd) | OVERLAY_EX_STYLE;
        shell.set_ex_style(hwnd, style)?;
        Ok(())
    }

    /// One timer tick: attach if needed, blank for fullscreen apps, otherwise
    /// render fresh content and snap next to the tray
    pub fn tick(&mut self, source: &mut dyn ContentSource) -> TickOutcome {
        if !self.try_attach() {
            self.overlay.set_content("");
            return TickOutcome::Detached;
        }
        let EmbeddingState::Running { taskbar } = self.state else {
            return TickOutcome::Detached;
        };

        if self.locator.is_fullscreen_active(taskbar) {
            self.overlay.set_content("");
            return TickOutcome::Hidden;
        }

        let content = source.render();
        self.overlay.set_content(&content);

        if self.held {
            return TickOutcome::Held;
        }

        match self.snap_position() {
            Some(placement) => TickOutcome::Positioned(placement),
            None => TickOutcome::Rendered,
        }
    }

    /// Move and resize the overlay to sit left of the tray, raising it in the
    /// same call. Returns `None` when not attached or the shell refuses.
    pub fn snap_position(&mut self) -> Option<Placement> {
        let EmbeddingState::Running { taskbar } = self.state else {
            return None;
        };

        let Some(geometry) = self.locator.geometry(taskbar) else {
            log::debug!("Taskbar {:#x} has no rectangle, skipping reposition", taskbar.0);
            return None;
        };

        let placement = compute_placement(
            &geometry,
            self.overlay.preferred_width(),
            self.overlay.scale_factor(),
            self.margin_right,
        );

        match self
            .locator
            .shell()
            .set_window_pos(self.overlay.handle(), placement.physical_rect())
        {
            Ok(()) => {
                log::trace!(
                    "Overlay at ({}, {}) size {}x{} scale {}",
                    placement.x,
                    placement.y,
                    placement.width,
                    placement.height,
                    placement.scale
                );
                Some(placement)
            }
            Err(e) => {
                log::debug!("Failed to reposition overlay: {}", e);
                None
            }
        }
    }
}
