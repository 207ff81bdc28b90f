use crate::platform::{Rect, WindowHandle};

/// Logical pixels trimmed from the taskbar height so the overlay never touches its edges
pub const VERTICAL_PADDING: f64 = 4.0;

/// Where the taskbar is this tick. Never cached across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskbarGeometry {
    pub taskbar: WindowHandle,
    /// Taskbar rectangle in physical screen pixels
    pub rect: Rect,
    /// Width of the notification area, physical pixels
    pub tray_width: i32,
}

/// Overlay position and size in logical pixels, plus the scale it was computed for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub scale: f64,
}

impl Placement {
    /// The same box in physical pixels, as the native move call wants it
    pub fn physical_rect(&self) -> Rect {
        let scale = self.scale;
        let to_physical = |v: i32| (v as f64 * scale).round() as i32;
        Rect::from_size(
            to_physical(self.x),
            to_physical(self.y),
            to_physical(self.width),
            to_physical(self.height),
        )
    }
}

/// Place an overlay of `logical_width` just left of the tray, vertically centred.
///
/// Math runs in physical pixels and is truncated back to logical pixels at the
/// end. A non-positive or non-finite `scale` is treated as 1.0.
pub fn compute_placement(
    geometry: &TaskbarGeometry,
    logical_width: i32,
    scale: f64,
    margin_right: i32,
) -> Placement {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let rect = geometry.rect;

    let taskbar_height = rect.height() as f64;
    let logical_height = (taskbar_height / scale - VERTICAL_PADDING).max(1.0);

    let physical_width = logical_width as f64 * scale;
    let physical_height = logical_height * scale;
    let physical_margin = margin_right as f64 * scale;

    let physical_x =
        rect.right as f64 - geometry.tray_width as f64 - physical_width - physical_margin;
    let physical_y = rect.top as f64 + (taskbar_height - physical_height) / 2.0;

    Placement {
        x: (physical_x / scale) as i32,
        y: (physical_y / scale) as i32,
        width: logical_width,
        height: logical_height as i32,
        scale,
    }
}
