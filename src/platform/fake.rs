//! In-memory window manager.
//!
//! Lets the taskbar logic run (and be tested) without a Windows shell. Windows
//! are plain records; every mutation goes through `&self` so a test can keep an
//! `Rc<FakeShell>` and reshape the desktop while a controller holds another.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::shell::{Rect, ShellApi, WindowHandle};
use crate::error::{ObidomeError, Result};

#[derive(Debug, Clone)]
struct FakeWindow {
    class_name: String,
    parent: Option<WindowHandle>,
    rect: Rect,
    visible: bool,
    ex_style: u32,
    owner: Option<WindowHandle>,
}

#[derive(Debug)]
pub struct FakeShell {
    windows: RefCell<HashMap<WindowHandle, FakeWindow>>,
    next_handle: Cell<isize>,
    foreground: Cell<Option<WindowHandle>>,
    screen: Cell<(i32, i32)>,
    placements: RefCell<Vec<(WindowHandle, Rect)>>,
}

impl FakeShell {
    pub fn new(screen_width: i32, screen_height: i32) -> Self {
        Self {
            windows: RefCell::new(HashMap::new()),
            next_handle: Cell::new(0x100),
            foreground: Cell::new(None),
            screen: Cell::new((screen_width, screen_height)),
            placements: RefCell::new(Vec::new()),
        }
    }

    pub fn add_window(&self, class_name: &str, rect: Rect) -> WindowHandle {
        self.insert(class_name, None, rect)
    }

    pub fn add_child(&self, parent: WindowHandle, class_name: &str, rect: Rect) -> WindowHandle {
        self.insert(class_name, Some(parent), rect)
    }

    fn insert(&self, class_name: &str, parent: Option<WindowHandle>, rect: Rect) -> WindowHandle {
        let handle = WindowHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);

        self.windows.borrow_mut().insert(
            handle,
            FakeWindow {
                class_name: class_name.to_string(),
                parent,
                rect,
                visible: true,
                ex_style: 0,
                owner: None,
            },
        );
        handle
    }

    pub fn remove_window(&self, hwnd: WindowHandle) {
        self.windows.borrow_mut().remove(&hwnd);
        if self.foreground.get() == Some(hwnd) {
            self.foreground.set(None);
        }
    }

    pub fn set_foreground(&self, hwnd: Option<WindowHandle>) {
        self.foreground.set(hwnd);
    }

    pub fn set_visible(&self, hwnd: WindowHandle, visible: bool) {
        if let Some(window) = self.windows.borrow_mut().get_mut(&hwnd) {
            window.visible = visible;
        }
    }

    pub fn set_rect(&self, hwnd: WindowHandle, rect: Rect) {
        if let Some(window) = self.windows.borrow_mut().get_mut(&hwnd) {
            window.rect = rect;
        }
    }

    pub fn set_screen_size(&self, width: i32, height: i32) {
        self.screen.set((width, height));
    }

    pub fn owner_of(&self, hwnd: WindowHandle) -> Option<WindowHandle> {
        self.windows.borrow().get(&hwnd).and_then(|w| w.owner)
    }

    /// Every `set_window_pos` call so far, oldest first
    pub fn placements(&self) -> Vec<(WindowHandle, Rect)> {
        self.placements.borrow().clone()
    }

    pub fn last_placement(&self) -> Option<(WindowHandle, Rect)> {
        self.placements.borrow().last().copied()
    }

    fn missing(hwnd: WindowHandle) -> ObidomeError {
        ObidomeError::platform(format!("no such window {:#x}", hwnd.0))
    }
}

impl Default for FakeShell {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl ShellApi for FakeShell {
    fn find_window(&self, class_name: &str) -> Option<WindowHandle> {
        let windows = self.windows.borrow();
        let mut matches: Vec<_> = windows
            .iter()
            .filter(|(_, w)| w.parent.is_none() && w.class_name == class_name)
            .map(|(h, _)| *h)
            .collect();
        matches.sort_by_key(|h| h.0);
        matches.first().copied()
    }

    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle> {
        let windows = self.windows.borrow();
        let mut matches: Vec<_> = windows
            .iter()
            .filter(|(_, w)| w.parent == Some(parent) && w.class_name == class_name)
            .map(|(h, _)| *h)
            .collect();
        matches.sort_by_key(|h| h.0);
        matches.first().copied()
    }

    fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
        self.windows.borrow().get(&hwnd).map(|w| w.rect)
    }

    fn is_window_visible(&self, hwnd: WindowHandle) -> bool {
        self.windows.borrow().get(&hwnd).is_some_and(|w| w.visible)
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.foreground.get()
    }

    fn class_name(&self, hwnd: WindowHandle) -> Option<String> {
        self.windows.borrow().get(&hwnd).map(|w| w.class_name.clone())
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen.get()
    }

    fn ex_style(&self, hwnd: WindowHandle) -> u32 {
        self.windows.borrow().get(&hwnd).map_or(0, |w| w.ex_style)
    }

    fn set_ex_style(&self, hwnd: WindowHandle, style: u32) -> Result<()> {
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&hwnd).ok_or_else(|| Self::missing(hwnd))?;
        window.ex_style = style;
        Ok(())
    }

    fn set_owner(&self, hwnd: WindowHandle, owner: WindowHandle) -> Result<()> {
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&hwnd).ok_or_else(|| Self::missing(hwnd))?;
        window.owner = Some(owner);
        Ok(())
    }

    fn set_window_pos(&self, hwnd: WindowHandle, rect: Rect) -> Result<()> {
        {
            let mut windows = self.windows.borrow_mut();
            let window = windows.get_mut(&hwnd).ok_or_else(|| Self::missing(hwnd))?;
            window.rect = rect;
            window.visible = true;
        }
        self.placements.borrow_mut().push((hwnd, rect));
        Ok(())
    }
}
