// Turning the rendered template into pixels for the overlay

pub mod compose;
#[cfg(windows)]
pub mod overlay_win32;
pub mod text;
#[cfg(windows)]
pub mod tray_win32;

pub use compose::{compose, TextRasterizer};
pub use text::{html_to_text, Fragment, Inline};
