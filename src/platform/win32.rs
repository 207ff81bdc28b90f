//! [`ShellApi`] on top of user32.

use std::mem;
use std::ptr;

use windows_sys::Win32::Foundation::{GetLastError, SetLastError, HWND, RECT};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, FindWindowW, GetClassNameW, GetForegroundWindow, GetSystemMetrics,
    GetWindowLongW, GetWindowRect, IsWindowVisible, SetWindowLongW, SetWindowPos, GWL_EXSTYLE,
    HWND_TOP, SM_CXSCREEN, SM_CYSCREEN, SWP_NOACTIVATE, SWP_SHOWWINDOW,
};

use super::shell::{Rect, ShellApi, WindowHandle};
use crate::error::{ObidomeError, Result};

const GWLP_HWNDPARENT: i32 = -8;
const CLASS_NAME_CAPACITY: usize = 256;

pub(crate) fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

pub(crate) fn to_hwnd(handle: WindowHandle) -> HWND {
    handle.0 as HWND
}

fn from_hwnd(hwnd: HWND) -> Option<WindowHandle> {
    if hwnd.is_null() {
        None
    } else {
        Some(WindowHandle(hwnd as isize))
    }
}

fn last_error(call: &str) -> ObidomeError {
    let code = unsafe { GetLastError() };
    ObidomeError::platform(format!("{} failed (error {})", call, code))
}

/// The real Windows shell. Stateless; every call goes straight to user32.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Shell;

impl Win32Shell {
    pub fn new() -> Self {
        Self
    }
}

impl ShellApi for Win32Shell {
    fn find_window(&self, class_name: &str) -> Option<WindowHandle> {
        let class = wide(class_name);
        from_hwnd(unsafe { FindWindowW(class.as_ptr(), ptr::null()) })
    }

    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle> {
        let class = wide(class_name);
        from_hwnd(unsafe {
            FindWindowExW(
                to_hwnd(parent),
                ptr::null_mut(),
                class.as_ptr(),
                ptr::null(),
            )
        })
    }

    fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
        let mut rect: RECT = unsafe { mem::zeroed() };
        if unsafe { GetWindowRect(to_hwnd(hwnd), &mut rect) } == 0 {
            return None;
        }
        Some(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn is_window_visible(&self, hwnd: WindowHandle) -> bool {
        unsafe { IsWindowVisible(to_hwnd(hwnd)) != 0 }
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        from_hwnd(unsafe { GetForegroundWindow() })
    }

    fn class_name(&self, hwnd: WindowHandle) -> Option<String> {
        let mut buffer = [0u16; CLASS_NAME_CAPACITY];
        let len = unsafe {
            GetClassNameW(to_hwnd(hwnd), buffer.as_mut_ptr(), buffer.len() as i32)
        };
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buffer[..len as usize]))
    }

    fn screen_size(&self) -> (i32, i32) {
        unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
    }

    fn ex_style(&self, hwnd: WindowHandle) -> u32 {
        unsafe { GetWindowLongW(to_hwnd(hwnd), GWL_EXSTYLE) as u32 }
    }

    fn set_ex_style(&self, hwnd: WindowHandle, style: u32) -> Result<()> {
        // SetWindowLong returns the previous value, which may legitimately be 0
        unsafe {
            SetLastError(0);
            if SetWindowLongW(to_hwnd(hwnd), GWL_EXSTYLE, style as i32) == 0 && GetLastError() != 0
            {
                return Err(last_error("SetWindowLongW(GWL_EXSTYLE)"));
            }
        }
        Ok(())
    }

    fn set_owner(&self, hwnd: WindowHandle, owner: WindowHandle) -> Result<()> {
        unsafe {
            SetLastError(0);
            if set_window_long_ptr(to_hwnd(hwnd), GWLP_HWNDPARENT, owner.0) == 0
                && GetLastError() != 0
            {
                return Err(last_error("SetWindowLongPtrW(GWLP_HWNDPARENT)"));
            }
        }
        Ok(())
    }

    fn set_window_pos(&self, hwnd: WindowHandle, rect: Rect) -> Result<()> {
        let ok = unsafe {
            SetWindowPos(
                to_hwnd(hwnd),
                HWND_TOP,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_NOACTIVATE | SWP_SHOWWINDOW,
            )
        };
        if ok == 0 {
            return Err(last_error("SetWindowPos"));
        }
        Ok(())
    }
}

#[cfg(target_pointer_width = "64")]
unsafe fn set_window_long_ptr(hwnd: HWND, index: i32, value: isize) -> isize {
    windows_sys::Win32::UI::WindowsAndMessaging::SetWindowLongPtrW(hwnd, index, value)
}

#[cfg(target_pointer_width = "32")]
unsafe fn set_window_long_ptr(hwnd: HWND, index: i32, value: isize) -> isize {
    SetWindowLongW(hwnd, index, value as i32) as isize
}
