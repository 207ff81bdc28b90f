// Platform-specific code module

pub mod elevation;
pub mod fake;
pub mod shell;
#[cfg(windows)]
pub mod win32;

pub use elevation::is_current_user_admin;
pub use fake::FakeShell;
pub use shell::{
    Rect, ShellApi, WindowHandle, EX_STYLE_LAYERED, EX_STYLE_TOOLWINDOW, EX_STYLE_TRANSPARENT,
    OVERLAY_EX_STYLE,
};
#[cfg(windows)]
pub use win32::Win32Shell;
