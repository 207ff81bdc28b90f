//! The overlay window on Windows: a borderless layered popup whose pixels come
//! from [`compose`](crate::ui::compose()) and are pushed with per-pixel alpha.
//!
//! Everything here runs on the thread that created the window.

use std::cell::RefCell;
use std::mem;
use std::ptr;
use std::slice;

use tiny_skia::Pixmap;
use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WPARAM};
use windows_sys::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, CreateFontIndirectW, DeleteDC, DeleteObject, DrawTextW,
    GdiFlush, GetDC, ReleaseDC, SelectObject, SetBkMode, SetTextColor, AC_SRC_ALPHA, AC_SRC_OVER,
    ANTIALIASED_QUALITY, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION, DIB_RGB_COLORS,
    DT_CALCRECT, DT_NOPREFIX, DT_SINGLELINE, HBITMAP, HDC, HFONT, HGDIOBJ, LOGFONTW, TRANSPARENT,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::HiDpi::{
    GetDpiForWindow, SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, RegisterClassW, ShowWindow,
    UpdateLayeredWindow, SW_SHOWNOACTIVATE, ULW_ALPHA, WM_WINDOWPOSCHANGED, WNDCLASSW,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

use crate::core::sparkline::Color;
use crate::core::taskbar::OverlaySurface;
use crate::error::{ObidomeError, Result};
use crate::platform::win32::wide;
use crate::platform::WindowHandle;
use crate::ui::compose::{compose, coverage_pixel, fit_into, to_bgra, TextRasterizer};
use crate::ui::text::{css_color, css_font_family, css_font_size, Fragment};

const CLASS_NAME: &str = "ObidomeOverlay";
const DEFAULT_FONT_PX: f64 = 14.0;
const DEFAULT_FONT_FAMILY: &str = "Consolas";
const DEFAULT_TEXT_COLOR: Color = Color::rgba(255, 255, 255, 255);
const BASE_DPI: f64 = 96.0;
/// Logical pixels added around the content
const HORIZONTAL_PADDING: i32 = 4;

#[derive(Debug, Clone)]
struct TextStyle {
    font_px: f64,
    font_family: String,
    color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_px: DEFAULT_FONT_PX,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: DEFAULT_TEXT_COLOR,
        }
    }
}

thread_local! {
    // Last composed content; the window procedure repaints from it after resizes
    static FRAME: RefCell<Option<Pixmap>> = const { RefCell::new(None) };
}

/// Opt the process into per-monitor DPI so window rects are physical pixels
pub fn enable_dpi_awareness() {
    let ok = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };
    if ok == 0 {
        log::debug!("Per-monitor DPI awareness unavailable, coordinates may be scaled");
    }
}

pub struct Win32Overlay {
    hwnd: HWND,
    style: TextStyle,
    last_width: i32,
}

impl Win32Overlay {
    pub fn create() -> Result<Self> {
        let class_name = wide(CLASS_NAME);

        unsafe {
            let instance = GetModuleHandleW(ptr::null());

            let mut class: WNDCLASSW = mem::zeroed();
            class.lpfnWndProc = Some(wnd_proc);
            class.hInstance = instance;
            class.lpszClassName = class_name.as_ptr();
            if RegisterClassW(&class) == 0 {
                return Err(ObidomeError::platform("RegisterClassW failed"));
            }

            let title = wide("obidome");
            let hwnd = CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOOLWINDOW | WS_EX_TOPMOST | WS_EX_NOACTIVATE,
                class_name.as_ptr(),
                title.as_ptr(),
                WS_POPUP,
                0,
                0,
                1,
                1,
                ptr::null_mut(),
                ptr::null_mut(),
                instance,
                ptr::null(),
            );
            if hwnd.is_null() {
                return Err(ObidomeError::platform("CreateWindowExW failed"));
            }

            ShowWindow(hwnd, SW_SHOWNOACTIVATE);

            Ok(Self {
                hwnd,
                style: TextStyle::default(),
                last_width: 1,
            })
        }
    }

    fn update_style(&mut self, fragment: &Fragment) {
        let Some(style) = fragment.style.as_deref() else {
            return;
        };
        if let Some(px) = css_font_size(style) {
            self.style.font_px = px;
        }
        if let Some(family) = css_font_family(style) {
            self.style.font_family = family;
        }
        if let Some(color) = css_color(style) {
            self.style.color = color;
        }
    }
}

impl Drop for Win32Overlay {
    fn drop(&mut self) {
        unsafe {
            DestroyWindow(self.hwnd);
        }
    }
}

impl OverlaySurface for Win32Overlay {
    fn handle(&self) -> WindowHandle {
        WindowHandle(self.hwnd as isize)
    }

    fn scale_factor(&self) -> f64 {
        let dpi = unsafe { GetDpiForWindow(self.hwnd) };
        if dpi == 0 {
            1.0
        } else {
            dpi as f64 / BASE_DPI
        }
    }

    fn preferred_width(&self) -> i32 {
        self.last_width
    }

    fn set_content(&mut self, content: &str) {
        let fragment = Fragment::parse(content);
        self.update_style(&fragment);

        let scale = self.scale_factor();
        let frame = match GdiText::new(&self.style, scale) {
            Some(mut text) => compose(&fragment, &mut text, scale as f32),
            None => {
                log::debug!("Failed to set up text rendering");
                None
            }
        };

        // Blank content keeps the last width so the overlay does not jump
        if let Some(frame) = &frame {
            self.last_width = (frame.width() as f64 / scale).ceil() as i32 + HORIZONTAL_PADDING;
        }

        FRAME.with(|slot| *slot.borrow_mut() = frame);
        unsafe { present(self.hwnd) };
    }
}

/// Text runs drawn by GDI into a memory DC.
///
/// GDI has no usable alpha, so runs are drawn white on black and the green
/// channel is taken as coverage for the configured color.
struct GdiText {
    dc: HDC,
    font: HFONT,
    previous_font: HGDIOBJ,
    color: Color,
}

impl GdiText {
    fn new(style: &TextStyle, scale: f64) -> Option<Self> {
        unsafe {
            let dc = CreateCompatibleDC(ptr::null_mut());
            if dc.is_null() {
                return None;
            }

            let mut font: LOGFONTW = mem::zeroed();
            font.lfHeight = -((style.font_px * scale).round() as i32);
            font.lfWeight = 400;
            font.lfQuality = ANTIALIASED_QUALITY;
            for (slot, unit) in font
                .lfFaceName
                .iter_mut()
                .take(31)
                .zip(style.font_family.encode_utf16())
            {
                *slot = unit;
            }
            let font = CreateFontIndirectW(&font);
            let previous_font = SelectObject(dc, font);

            SetBkMode(dc, TRANSPARENT);
            SetTextColor(dc, 0x00FF_FFFF);

            Some(Self {
                dc,
                font,
                previous_font,
                color: style.color,
            })
        }
    }
}

impl Drop for GdiText {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc, self.previous_font);
            DeleteObject(self.font);
            DeleteDC(self.dc);
        }
    }
}

impl TextRasterizer for GdiText {
    fn rasterize(&mut self, text: &str) -> Option<Pixmap> {
        let mut units: Vec<u16> = text.encode_utf16().collect();
        if units.is_empty() {
            return None;
        }

        unsafe {
            let mut bounds: RECT = mem::zeroed();
            DrawTextW(
                self.dc,
                units.as_mut_ptr(),
                units.len() as i32,
                &mut bounds,
                DT_CALCRECT | DT_NOPREFIX | DT_SINGLELINE,
            );
            let width = bounds.right - bounds.left;
            let height = bounds.bottom - bounds.top;
            if width <= 0 || height <= 0 {
                return None;
            }

            let (bitmap, bits) = create_dib(self.dc, width, height)?;
            let previous_bitmap = SelectObject(self.dc, bitmap);

            let mut target = RECT {
                left: 0,
                top: 0,
                right: width,
                bottom: height,
            };
            DrawTextW(
                self.dc,
                units.as_mut_ptr(),
                units.len() as i32,
                &mut target,
                DT_NOPREFIX | DT_SINGLELINE,
            );
            GdiFlush();

            let mut pixmap = Pixmap::new(width as u32, height as u32);
            if let Some(pixmap) = pixmap.as_mut() {
                let drawn = slice::from_raw_parts(bits, (width * height * 4) as usize);
                for (dst, src) in pixmap.data_mut().chunks_exact_mut(4).zip(drawn.chunks_exact(4)) {
                    dst.copy_from_slice(&coverage_pixel(self.color, src[1]));
                }
            }

            SelectObject(self.dc, previous_bitmap);
            DeleteObject(bitmap);
            pixmap
        }
    }
}

/// Zero-filled top-down 32-bit DIB section
unsafe fn create_dib(dc: HDC, width: i32, height: i32) -> Option<(HBITMAP, *mut u8)> {
    let mut info: BITMAPINFO = mem::zeroed();
    info.bmiHeader = BITMAPINFOHEADER {
        biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
        biWidth: width,
        biHeight: -height,
        biPlanes: 1,
        biBitCount: 32,
        biCompression: BI_RGB,
        ..mem::zeroed()
    };

    let mut bits: *mut std::ffi::c_void = ptr::null_mut();
    let bitmap = CreateDIBSection(dc, &info, DIB_RGB_COLORS, &mut bits, ptr::null_mut(), 0);
    if bitmap.is_null() || bits.is_null() {
        if !bitmap.is_null() {
            DeleteObject(bitmap);
        }
        return None;
    }
    Some((bitmap, bits as *mut u8))
}

/// Push the current frame to the window at its current size
unsafe fn present(hwnd: HWND) {
    let mut client: RECT = mem::zeroed();
    GetClientRect(hwnd, &mut client);
    let width = client.right - client.left;
    let height = client.bottom - client.top;
    if width <= 0 || height <= 0 {
        return;
    }

    let Some(canvas) = FRAME.with(|slot| fit_into(slot.borrow().as_ref(), width as u32, height as u32))
    else {
        return;
    };

    let screen_dc = GetDC(ptr::null_mut());
    let mem_dc = CreateCompatibleDC(screen_dc);
    if let Some((bitmap, bits)) = create_dib(mem_dc, width, height) {
        let previous_bitmap = SelectObject(mem_dc, bitmap);
        let pixels = to_bgra(&canvas);
        ptr::copy_nonoverlapping(pixels.as_ptr(), bits, pixels.len());

        let size = SIZE {
            cx: width,
            cy: height,
        };
        let origin = POINT { x: 0, y: 0 };
        let blend = BLENDFUNCTION {
            BlendOp: AC_SRC_OVER as u8,
            BlendFlags: 0,
            SourceConstantAlpha: 255,
            AlphaFormat: AC_SRC_ALPHA as u8,
        };
        if UpdateLayeredWindow(
            hwnd,
            screen_dc,
            ptr::null(),
            &size,
            mem_dc,
            &origin,
            0,
            &blend,
            ULW_ALPHA,
        ) == 0
        {
            log::debug!("UpdateLayeredWindow failed");
        }

        SelectObject(mem_dc, previous_bitmap);
        DeleteObject(bitmap);
    }
    DeleteDC(mem_dc);
    ReleaseDC(ptr::null_mut(), screen_dc);
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if msg == WM_WINDOWPOSCHANGED {
        // Snapping resizes the window; redraw the frame at the new size
        present(hwnd);
    }
    DefWindowProcW(hwnd, msg, wparam, lparam)
}
