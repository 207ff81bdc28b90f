//! Taskbar discovery and overlay placement.

mod embedding;
mod geometry;
mod locator;

pub use embedding::{
    ContentSource, EmbeddingController, EmbeddingState, OverlaySurface, TickOutcome,
    ATTACH_RETRY_DELAY, FIRST_ATTACH_DELAY,
};
pub use geometry::{compute_placement, Placement, TaskbarGeometry, VERTICAL_PADDING};
pub use locator::{
    TaskbarLocator, DEFAULT_TRAY_WIDTH, MAX_PLAUSIBLE_TRAY_WIDTH, SHELL_WINDOW_CLASSES,
    TASKBAR_CLASS, TRAY_NOTIFY_CLASS,
};
