use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tiny_skia::{
    FillRule, GradientStop, LinearGradient, Paint, Path, PathBuilder, Pixmap, Point, Shader,
    SpreadMode, Stroke, Transform,
};

use super::history::SparklineHistory;
use super::{Color, FillStyle, SparklineSettings};
use crate::error::{ObidomeError, Result};

const LINE_WIDTH: f32 = 2.0;
const GRADIENT_TOP_ALPHA: u8 = 180;
const GRADIENT_BOTTOM_ALPHA: u8 = 20;

const FALLBACK_LINE: Color = Color::rgba(0, 255, 0, 255);

/// Turns a stream of samples into PNG data URIs.
///
/// Each frame is drawn on a fresh pixmap and only replaces the previous frame
/// once it has been fully encoded; if encoding fails the last good frame is
/// returned again.
pub struct SparklineRenderer {
    width: u32,
    height: u32,
    line_color: Color,
    fill_style: FillStyle,
    fill_color: Color,
    history: SparklineHistory,
    last_frame: Option<String>,
}

impl SparklineRenderer {
    /// Invalid settings are logged and replaced with defaults rather than rejected
    pub fn new(settings: &SparklineSettings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings.clone(),
            Err(e) => {
                log::warn!("Invalid sparkline settings ({}), using defaults", e);
                SparklineSettings::default()
            }
        };

        let line_color = Color::parse(&settings.line_color).unwrap_or(FALLBACK_LINE);
        let fill_color = Color::parse(&settings.fill_color).unwrap_or(line_color);

        Self {
            width: settings.width,
            height: settings.height,
            line_color,
            fill_style: settings.fill_style,
            fill_color,
            history: SparklineHistory::new(settings.buffer_len, settings.scale()),
            last_frame: None,
        }
    }

    /// Append `value` and return the new frame as `data:image/png;base64,...`
    pub fn update_and_encode(&mut self, value: f64) -> String {
        self.history.push(value);

        match self.render() {
            Ok(frame) => {
                self.last_frame = Some(frame.clone());
                frame
            }
            Err(e) => {
                log::warn!("Failed to render sparkline, keeping previous frame: {}", e);
                self.last_frame.clone().unwrap_or_default()
            }
        }
    }

    pub fn render(&self) -> Result<String> {
        let png = self.render_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    pub fn render_png(&self) -> Result<Vec<u8>> {
        self.render_pixmap()?
            .encode_png()
            .map_err(|e| ObidomeError::render(format!("PNG encoding failed: {}", e)))
    }

    fn render_pixmap(&self) -> Result<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or_else(|| {
            ObidomeError::render(format!("cannot allocate a {}x{} frame", self.width, self.height))
        })?;

        // With fewer than two points there is no line, just the empty baseline
        let points = self.points();
        if points.len() < 2 {
            return Ok(pixmap);
        }

        if let (Some(paint), Some(area)) = (self.fill_paint(), area_path(&points, self.height as f32)) {
            pixmap.fill_path(&area, &paint, FillRule::Winding, Transform::identity(), None);
        }

        if let Some(line) = line_path(&points) {
            let mut paint = Paint::default();
            paint.set_color(self.line_color.into());
            paint.anti_alias = true;
            let stroke = Stroke {
                width: LINE_WIDTH,
                ..Stroke::default()
            };
            pixmap.stroke_path(&line, &paint, &stroke, Transform::identity(), None);
        }

        Ok(pixmap)
    }

    fn fill_paint(&self) -> Option<Paint<'static>> {
        let shader = match self.fill_style {
            FillStyle::None => return None,
            FillStyle::Solid => Shader::SolidColor(self.fill_color.into()),
            // Alpha ramps from the top edge of the frame to the bottom edge
            FillStyle::Gradient => LinearGradient::new(
                Point::from_xy(0.0, 0.0),
                Point::from_xy(0.0, self.height as f32),
                vec![
                    GradientStop::new(0.0, self.fill_color.with_alpha(GRADIENT_TOP_ALPHA).into()),
                    GradientStop::new(1.0, self.fill_color.with_alpha(GRADIENT_BOTTOM_ALPHA).into()),
                ],
                SpreadMode::Pad,
                Transform::identity(),
            )?,
        };

        Some(Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        })
    }

    /// Image-space points, `x = i * width / (n - 1)`, `y = height * (1 - normalized)`
    fn points(&self) -> Vec<(f32, f32)> {
        let normalized = self.history.normalized();
        let n = normalized.len();
        if n < 2 {
            return Vec::new();
        }

        let step_x = self.width as f64 / (n - 1) as f64;
        let height = self.height as f64;

        normalized
            .iter()
            .enumerate()
            .map(|(i, ratio)| ((i as f64 * step_x) as f32, (height * (1.0 - ratio)) as f32))
            .collect()
    }

    pub fn history(&self) -> &SparklineHistory {
        &self.history
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }
}

fn line_path(points: &[(f32, f32)]) -> Option<Path> {
    let (&(x, y), rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(x, y);
    for &(x, y) in rest {
        builder.line_to(x, y);
    }
    builder.finish()
}

/// The polyline closed along the bottom edge
fn area_path(points: &[(f32, f32)], bottom: f32) -> Option<Path> {
    let first = points.first()?;
    let last = points.last()?;

    let mut builder = PathBuilder::new();
    builder.move_to(first.0, bottom);
    for &(x, y) in points {
        builder.line_to(x, y);
    }
    builder.line_to(last.0, bottom);
    builder.close();
    builder.finish()
}
