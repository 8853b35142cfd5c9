//! Text measurement and glyph rendering for text watermarks.

use super::{Dimensions, Rgb};
use crate::config::WatermarkConfig;
use crate::error::{PdfToolError, Result};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Font files tried when no font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Largest text canvas painted, in pixels.
pub const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

/// Reject text canvases too large to allocate.
pub fn ensure_canvas_fits(dims: Dimensions) -> Result<()> {
    let pixels = dims.width as u64 * dims.height as u64;
    if pixels > MAX_CANVAS_PIXELS {
        return Err(PdfToolError::InvalidParameter {
            name: "fontSize".to_string(),
            message: format!(
                "text watermark of {}x{} pixels is too large",
                dims.width, dims.height
            ),
        });
    }
    Ok(())
}

/// Measures and rasterizes watermark text.
///
/// Sizes are in raster pixels.
pub trait TextPainter: Send + Sync {
    /// Bounding box of `text` at `px_size`.
    fn measure(&self, text: &str, px_size: f32) -> Result<Dimensions>;

    /// Render `text` onto a transparent canvas of the measured size. Glyph
    /// alpha is coverage times `round(255 * opacity)`.
    fn paint(&self, text: &str, px_size: f32, color: Rgb, opacity: f32) -> Result<RgbaImage>;
}

/// [`TextPainter`] backed by a TrueType font loaded with ab_glyph.
pub struct GlyphPainter {
    font: FontVec,
}

impl GlyphPainter {
    /// Load the configured font, or the first system font that exists.
    pub fn new(config: &WatermarkConfig) -> Result<Self> {
        let path = locate_font(config.font_path.as_deref())?;
        Self::from_file(&path)
    }

    /// Load a specific font file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            PdfToolError::FontNotFound(format!("cannot read {}: {}", path.display(), e))
        })?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            PdfToolError::FontNotFound(format!("invalid font {}: {}", path.display(), e))
        })?;
        info!("Loaded watermark font from {:?}", path);
        Ok(Self { font })
    }
}

/// Find a usable font file.
pub fn locate_font(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(PdfToolError::FontNotFound(format!(
            "configured font {} does not exist",
            path.display()
        )));
    }

    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            PdfToolError::FontNotFound(
                "set watermark.font_path or install DejaVu Sans".to_string(),
            )
        })
}

impl TextPainter for GlyphPainter {
    fn measure(&self, text: &str, px_size: f32) -> Result<Dimensions> {
        if !px_size.is_finite() || px_size <= 0.0 {
            return Err(PdfToolError::InvalidParameter {
                name: "fontSize".to_string(),
                message: format!("invalid pixel size {}", px_size),
            });
        }
        let scaled = self.font.as_scaled(PxScale::from(px_size));

        let mut width = 0.0f32;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        let dims = Dimensions::new(
            (width.ceil() as u32).max(1),
            (scaled.height().ceil() as u32).max(1),
        );
        debug!(text, px_size, width = dims.width, height = dims.height, "Measured text");
        Ok(dims)
    }

    fn paint(&self, text: &str, px_size: f32, color: Rgb, opacity: f32) -> Result<RgbaImage> {
        let dims = self.measure(text, px_size)?;
        ensure_canvas_fits(dims)?;
        let scale = PxScale::from(px_size);
        let scaled = self.font.as_scaled(scale);
        let mut canvas = RgbaImage::new(dims.width, dims.height);

        let alpha = (255.0 * opacity.clamp(0.0, 1.0)).round();
        let baseline = scaled.ascent();
        let mut cursor = 0.0f32;
        let mut prev = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                cursor += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor, baseline));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = gx as i64 + bounds.min.x as i64;
                    let y = gy as i64 + bounds.min.y as i64;
                    if x < 0 || y < 0 || x >= dims.width as i64 || y >= dims.height as i64 {
                        return;
                    }
                    let a = (coverage.clamp(0.0, 1.0) * alpha).round() as u8;
                    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                    // Overlapping glyph edges keep the stronger coverage.
                    if a > pixel[3] {
                        *pixel = Rgba([color.r, color.g, color.b, a]);
                    }
                });
            }
            cursor += scaled.h_advance(id);
            prev = Some(id);
        }

        Ok(canvas)
    }
}
