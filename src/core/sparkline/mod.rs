//! Sparkline history buffers and PNG rendering.

mod history;
mod renderer;

pub use history::{Scale, SparklineHistory};
pub use renderer::SparklineRenderer;

use serde::{Deserialize, Serialize};

use crate::error::{ObidomeError, Result};

pub const DEFAULT_BUFFER_LEN: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStyle {
    Solid,
    #[default]
    Gradient,
    None,
}

/// How one plotted metric is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparklineSettings {
    /// `#RRGGBB`, `#AARRGGBB` or `#RGB`
    pub line_color: String,
    pub fill_style: FillStyle,
    pub fill_color: String,
    pub width: u32,
    pub height: u32,
    pub buffer_len: usize,
    /// Fixed range when both bounds are set, auto-scaling otherwise
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl Default for SparklineSettings {
    fn default() -> Self {
        Self {
            line_color: "#00ff00".to_string(),
            fill_style: FillStyle::Gradient,
            fill_color: "#00ff00".to_string(),
            width: 50,
            height: 30,
            buffer_len: DEFAULT_BUFFER_LEN,
            min_value: Some(0.0),
            max_value: Some(100.0),
        }
    }
}

impl SparklineSettings {
    pub fn scale(&self) -> Scale {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => Scale::Fixed { min, max },
            _ => Scale::Auto,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ObidomeError::config("sparkline width and height must be positive"));
        }
        if self.buffer_len == 0 {
            return Err(ObidomeError::config("sparkline buffer_len must be at least 1"));
        }
        if let Scale::Fixed { min, max } = self.scale() {
            if max <= min {
                return Err(ObidomeError::config(format!(
                    "sparkline max_value ({}) must be greater than min_value ({})",
                    max, min
                )));
            }
        }
        Color::parse(&self.line_color)?;
        Color::parse(&self.fill_color)?;
        Ok(())
    }
}

/// Straight (non-premultiplied) RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#AARRGGBB` (alpha first, Qt style)
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ObidomeError::config(format!("invalid color '{}'", text));

        let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, 255))
            }
            6 => Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(Self::rgba(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => Err(invalid()),
        }
    }
}

impl From<Color> for tiny_skia::Color {
    fn from(color: Color) -> Self {
        tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
