//! The window-manager surface the taskbar logic depends on.

use crate::error::Result;

/// Native window handle, stored as an integer so it can cross the trait
/// boundary without carrying raw pointers around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Screen rectangle in physical pixels, right/bottom exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

// Extended window styles, same bit values as the Win32 WS_EX_* constants
pub const EX_STYLE_TOPMOST: u32 = 0x0000_0008;
pub const EX_STYLE_TRANSPARENT: u32 = 0x0000_0020;
pub const EX_STYLE_TOOLWINDOW: u32 = 0x0000_0080;
pub const EX_STYLE_LAYERED: u32 = 0x0008_0000;
pub const EX_STYLE_NOACTIVATE: u32 = 0x0800_0000;

/// Styles applied to the overlay when it attaches to the taskbar:
/// layered, transparent to mouse input and hidden from Alt+Tab
pub const OVERLAY_EX_STYLE: u32 = EX_STYLE_LAYERED | EX_STYLE_TRANSPARENT | EX_STYLE_TOOLWINDOW;

/// Window-manager operations used to find the taskbar and place the overlay.
///
/// Implemented by [`crate::platform::win32::Win32Shell`] on Windows and by
/// [`crate::platform::fake::FakeShell`] everywhere else.
pub trait ShellApi {
    /// Top-level window by class name
    fn find_window(&self, class_name: &str) -> Option<WindowHandle>;

    /// Direct child of `parent` by class name
    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle>;

    fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect>;

    fn is_window_visible(&self, hwnd: WindowHandle) -> bool;

    fn foreground_window(&self) -> Option<WindowHandle>;

    fn class_name(&self, hwnd: WindowHandle) -> Option<String>;

    /// Primary screen resolution in physical pixels
    fn screen_size(&self) -> (i32, i32);

    fn ex_style(&self, hwnd: WindowHandle) -> u32;

    fn set_ex_style(&self, hwnd: WindowHandle, style: u32) -> Result<()>;

    /// Make `owner` the owner window of `hwnd`
    fn set_owner(&self, hwnd: WindowHandle, owner: WindowHandle) -> Result<()>;

    /// Move, resize and raise `hwnd` to the top of its z-order in one call,
    /// without activating it
    fn set_window_pos(&self, hwnd: WindowHandle, rect: Rect) -> Result<()>;
}
