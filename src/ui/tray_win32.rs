//! Hidden host window on Windows: owns the tick timer and the notification
//! area icon with the widget's context menu.
//!
//! The overlay itself is click-through, so the icon is the only way to reach
//! the menu. Timer messages go to this window's procedure, which keeps ticks
//! running inside the menu's modal loop.

use std::cell::RefCell;
use std::mem;
use std::path::Path;
use std::ptr;
use std::time::Duration;

use anyhow::{Context, Result};
use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::Shell::{
    ShellExecuteW, Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE,
    NOTIFYICONDATAW,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    DispatchMessageW, GetCursorPos, GetMessageW, KillTimer, LoadIconW, PostMessageW,
    PostQuitMessage, RegisterClassW, SetForegroundWindow, SetTimer, TrackPopupMenu,
    TranslateMessage, IDI_APPLICATION, MF_STRING, MSG, SW_SHOWNORMAL, TPM_NONOTIFY,
    TPM_RETURNCMD, TPM_RIGHTBUTTON, WM_APP, WM_CLOSE, WM_CONTEXTMENU, WM_DESTROY, WM_NULL,
    WM_RBUTTONUP, WM_TIMER, WNDCLASSW, WS_EX_TOOLWINDOW, WS_POPUP,
};

use crate::core::{MenuAction, MenuCommand};
use crate::platform::win32::wide;

const CLASS_NAME: &str = "ObidomeTrayHost";
const TOOLTIP: &str = "obidome";
const ICON_ID: u32 = 1;
const TICK_TIMER_ID: usize = 1;
const WM_TRAY_ICON: u32 = WM_APP + 1;

/// What the host window forwards to the widget
pub trait TrayHandler {
    /// One tick; returns the delay until the next
    fn on_timer(&mut self) -> Duration;
    fn on_menu_opened(&mut self);
    fn on_menu_closed(&mut self, choice: Option<MenuCommand>) -> MenuAction;
}

impl<S, O> TrayHandler for crate::core::WidgetApp<S, O>
where
    S: crate::platform::ShellApi + ?Sized,
    O: crate::core::taskbar::OverlaySurface,
{
    fn on_timer(&mut self) -> Duration {
        crate::core::WidgetApp::on_timer(self)
    }

    fn on_menu_opened(&mut self) {
        self.menu_opened();
    }

    fn on_menu_closed(&mut self, choice: Option<MenuCommand>) -> MenuAction {
        self.menu_closed(choice)
    }
}

thread_local! {
    static HANDLER: RefCell<Option<Box<dyn TrayHandler>>> = RefCell::new(None);
}

/// Call into the handler unless it is already busy further up the stack
fn with_handler<R>(f: impl FnOnce(&mut dyn TrayHandler) -> R) -> Option<R> {
    HANDLER.with(|slot| match slot.try_borrow_mut() {
        Ok(mut slot) => slot.as_mut().map(|handler| f(handler.as_mut())),
        Err(_) => {
            log::debug!("Widget busy, dropping re-entrant call");
            None
        }
    })
}

fn millis(delay: Duration) -> u32 {
    delay.as_millis().clamp(1, u32::MAX as u128) as u32
}

/// Create the host window and icon, then pump messages until Quit or Ctrl+C
pub fn run(handler: Box<dyn TrayHandler>, first_delay: Duration) -> Result<()> {
    HANDLER.with(|slot| *slot.borrow_mut() = Some(handler));

    let hwnd = create_host_window()?;

    let host = hwnd as isize;
    ctrlc::set_handler(move || unsafe {
        PostMessageW(host as HWND, WM_CLOSE, 0, 0);
    })
    .context("Failed to install Ctrl+C handler")?;

    unsafe {
        if !add_icon(hwnd) {
            log::warn!("Failed to add the notification area icon; use Ctrl+C to quit");
        }
        if SetTimer(hwnd, TICK_TIMER_ID, millis(first_delay), None) == 0 {
            DestroyWindow(hwnd);
            anyhow::bail!("SetTimer failed");
        }

        let mut msg: MSG = mem::zeroed();
        loop {
            let status = GetMessageW(&mut msg, ptr::null_mut(), 0, 0);
            if status == 0 {
                break;
            }
            if status == -1 {
                anyhow::bail!("GetMessageW failed");
            }
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    HANDLER.with(|slot| slot.borrow_mut().take());
    log::info!("Message loop finished");
    Ok(())
}

fn create_host_window() -> Result<HWND> {
    let class_name = wide(CLASS_NAME);

    unsafe {
        let instance = GetModuleHandleW(ptr::null());

        let mut class: WNDCLASSW = mem::zeroed();
        class.lpfnWndProc = Some(wnd_proc);
        class.hInstance = instance;
        class.lpszClassName = class_name.as_ptr();
        if RegisterClassW(&class) == 0 {
            anyhow::bail!("RegisterClassW failed for the tray host");
        }

        // Never shown; a real top-level window so the menu can take the foreground
        let hwnd = CreateWindowExW(
            WS_EX_TOOLWINDOW,
            class_name.as_ptr(),
            class_name.as_ptr(),
            WS_POPUP,
            0,
            0,
            0,
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            instance,
            ptr::null(),
        );
        if hwnd.is_null() {
            anyhow::bail!("CreateWindowExW failed for the tray host");
        }
        Ok(hwnd)
    }
}

unsafe fn icon_data(hwnd: HWND) -> NOTIFYICONDATAW {
    let mut data: NOTIFYICONDATAW = mem::zeroed();
    data.cbSize = mem::size_of::<NOTIFYICONDATAW>() as u32;
    data.hWnd = hwnd;
    data.uID = ICON_ID;
    data
}

unsafe fn add_icon(hwnd: HWND) -> bool {
    let mut data = icon_data(hwnd);
    data.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
    data.uCallbackMessage = WM_TRAY_ICON;
    data.hIcon = LoadIconW(ptr::null_mut(), IDI_APPLICATION);
    // Keep the last unit as the terminator
    let max_len = data.szTip.len() - 1;
    for (slot, unit) in data.szTip.iter_mut().take(max_len).zip(TOOLTIP.encode_utf16()) {
        *slot = unit;
    }
    Shell_NotifyIconW(NIM_ADD, &data) != 0
}

unsafe fn remove_icon(hwnd: HWND) {
    let data = icon_data(hwnd);
    Shell_NotifyIconW(NIM_DELETE, &data);
}

/// Show the menu at the cursor and return the picked entry
unsafe fn track_menu(hwnd: HWND) -> Option<MenuCommand> {
    let menu = CreatePopupMenu();
    if menu.is_null() {
        return None;
    }

    for command in MenuCommand::ALL {
        let label = wide(command.label());
        AppendMenuW(menu, MF_STRING, command.id() as usize, label.as_ptr());
    }

    let mut cursor = POINT { x: 0, y: 0 };
    GetCursorPos(&mut cursor);
    // Without this the menu does not close when clicking elsewhere
    SetForegroundWindow(hwnd);
    let picked = TrackPopupMenu(
        menu,
        TPM_RIGHTBUTTON | TPM_RETURNCMD | TPM_NONOTIFY,
        cursor.x,
        cursor.y,
        0,
        hwnd,
        ptr::null(),
    );
    PostMessageW(hwnd, WM_NULL, 0, 0);
    DestroyMenu(menu);

    u16::try_from(picked).ok().and_then(MenuCommand::from_id)
}

unsafe fn show_menu(hwnd: HWND) {
    with_handler(|handler| handler.on_menu_opened());
    let choice = track_menu(hwnd);
    let action = with_handler(|handler| handler.on_menu_closed(choice));

    match action {
        Some(MenuAction::OpenFile(path)) => open_file(&path),
        Some(MenuAction::Quit) => {
            DestroyWindow(hwnd);
        }
        Some(MenuAction::Nothing) | None => {}
    }
}

/// Open with whatever the user associated with the file type
unsafe fn open_file(path: &Path) {
    let verb = wide("open");
    let file = wide(&path.to_string_lossy());
    let result = ShellExecuteW(
        ptr::null_mut(),
        verb.as_ptr(),
        file.as_ptr(),
        ptr::null(),
        ptr::null(),
        SW_SHOWNORMAL,
    );
    // Values up to 32 are error codes
    if result as isize <= 32 {
        log::warn!("Failed to open {} ({})", path.display(), result as isize);
    }
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_TIMER if wparam == TICK_TIMER_ID => {
            if let Some(next) = with_handler(|handler| handler.on_timer()) {
                SetTimer(hwnd, TICK_TIMER_ID, millis(next), None);
            }
            0
        }
        WM_TRAY_ICON => {
            let event = (lparam & 0xFFFF) as u32;
            if event == WM_RBUTTONUP || event == WM_CONTEXTMENU {
                show_menu(hwnd);
            }
            0
        }
        WM_CLOSE => {
            DestroyWindow(hwnd);
            0
        }
        WM_DESTROY => {
            KillTimer(hwnd, TICK_TIMER_ID);
            remove_icon(hwnd);
            PostQuitMessage(0);
            0
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
