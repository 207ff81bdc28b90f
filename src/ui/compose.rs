//! Laying a parsed template out into one premultiplied RGBA frame.
//!
//! Platform code only has to supply text rasterization; images and layout are
//! handled here with tiny-skia.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::core::sparkline::Color;
use crate::ui::text::{Fragment, Inline};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Draws single-line text runs in the overlay's font and color
pub trait TextRasterizer {
    /// Premultiplied image of `text` at physical size, `None` if nothing is drawn
    fn rasterize(&mut self, text: &str) -> Option<Pixmap>;
}

/// Decode an inline PNG. Other sources are not drawable.
pub fn decode_data_uri(src: &str) -> Option<Pixmap> {
    let payload = src.strip_prefix(PNG_DATA_URI_PREFIX)?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Pixmap::decode_png(&bytes).ok()
}

struct Piece {
    pixmap: Pixmap,
    scale: f32,
    width: u32,
    height: u32,
}

impl Piece {
    fn new(pixmap: Pixmap, scale: f32) -> Self {
        let width = (pixmap.width() as f32 * scale).round().max(1.0) as u32;
        let height = (pixmap.height() as f32 * scale).round().max(1.0) as u32;
        Self {
            pixmap,
            scale,
            width,
            height,
        }
    }
}

fn line_size(line: &[Piece]) -> (u32, u32) {
    let width = line.iter().map(|piece| piece.width).sum();
    let height = line.iter().map(|piece| piece.height).max().unwrap_or(0);
    (width, height)
}

/// Lay `fragment` out into a frame exactly as big as the content.
///
/// Lines stack top to bottom and are right-aligned, pieces are centred
/// vertically within their line. Text arrives at physical size, images are in
/// logical pixels and get multiplied by `scale`. Returns `None` for an empty
/// fragment.
pub fn compose(fragment: &Fragment, text: &mut dyn TextRasterizer, scale: f32) -> Option<Pixmap> {
    let lines: Vec<Vec<Piece>> = fragment
        .lines
        .iter()
        .map(|line| {
            line.iter()
                .filter_map(|inline| match inline {
                    Inline::Text(run) => text.rasterize(run).map(|pixmap| Piece::new(pixmap, 1.0)),
                    Inline::Image(src) => match decode_data_uri(src) {
                        Some(pixmap) => Some(Piece::new(pixmap, scale)),
                        None => {
                            log::debug!("Skipping image that is not an inline PNG");
                            None
                        }
                    },
                })
                .collect()
        })
        .collect();

    let width = lines.iter().map(|line| line_size(line).0).max().unwrap_or(0);
    let height = lines.iter().map(|line| line_size(line).1).sum();
    let mut frame = Pixmap::new(width, height)?;

    let mut top = 0;
    for line in &lines {
        let (line_width, line_height) = line_size(line);
        let mut left = width - line_width;

        for piece in line {
            let y = top + (line_height - piece.height) / 2;
            let paint = PixmapPaint {
                quality: if (piece.scale - 1.0).abs() < f32::EPSILON {
                    FilterQuality::Nearest
                } else {
                    FilterQuality::Bilinear
                },
                ..PixmapPaint::default()
            };
            frame.draw_pixmap(
                0,
                0,
                piece.pixmap.as_ref(),
                &paint,
                Transform::from_row(piece.scale, 0.0, 0.0, piece.scale, left as f32, y as f32),
                None,
            );
            left += piece.width;
        }
        top += line_height;
    }

    Some(frame)
}

/// A window-sized canvas with `frame` right-aligned and centred vertically.
/// Whatever does not fit is cut off on the left and at the bottom.
pub fn fit_into(frame: Option<&Pixmap>, width: u32, height: u32) -> Option<Pixmap> {
    let mut canvas = Pixmap::new(width, height)?;
    if let Some(frame) = frame {
        let x = width as i32 - frame.width() as i32;
        let y = ((height as i32 - frame.height() as i32) / 2).max(0);
        canvas.draw_pixmap(
            x,
            y,
            frame.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
    Some(canvas)
}

/// Premultiplied RGBA of `color` drawn with `coverage` (0 to 255)
pub fn coverage_pixel(color: Color, coverage: u8) -> [u8; 4] {
    let alpha = mul_div255(color.a, coverage);
    [
        mul_div255(color.r, alpha),
        mul_div255(color.g, alpha),
        mul_div255(color.b, alpha),
        alpha,
    ]
}

fn mul_div255(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// Pixels in the byte order of a 32-bit DIB section: B, G, R, A, premultiplied
pub fn to_bgra(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| [p.blue(), p.green(), p.red(), p.alpha()])
        .collect()
}
