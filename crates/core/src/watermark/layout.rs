//! Placement geometry for watermarks.
//!
//! Coordinates are device pixels of the page raster with the origin in the
//! top-left corner. Fixed positions sit [`MARGIN`] pixels away from the
//! relevant edges and may go negative when the content is larger than the
//! page. Tiles deliberately overshoot the far edges by one step; clipping is
//! left to the compositor.

use super::{WatermarkKind, WatermarkPosition};
use crate::error::{PdfToolError, Result};

/// Distance from the page edges for fixed positions.
pub const MARGIN: i64 = 50;

/// Gap between text tiles.
pub const TEXT_TILE_GAP: u32 = 100;

/// Gap between image tiles.
pub const IMAGE_TILE_GAP: u32 = 50;

/// Largest share of the page an image watermark may occupy per axis.
pub const MAX_IMAGE_FRACTION: f64 = 0.3;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn ensure_positive(&self, what: &str) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PdfToolError::InvalidGeometry(format!(
                "{} dimensions must be positive, got {}x{}",
                what, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// One box where the overlay is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Layout result for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementPlan {
    Single(Placement),
    /// Row-major grid; `step_x`/`step_y` are content size plus the tile gap.
    Tiled {
        step_x: u32,
        step_y: u32,
        placements: Vec<Placement>,
    },
}

impl PlacementPlan {
    /// All boxes of the plan in drawing order.
    pub fn placements(&self) -> &[Placement] {
        match self {
            PlacementPlan::Single(placement) => std::slice::from_ref(placement),
            PlacementPlan::Tiled { placements, .. } => placements,
        }
    }
}

impl WatermarkKind {
    /// Spacing added between tiles.
    pub fn tile_gap(&self) -> u32 {
        match self {
            WatermarkKind::Text => TEXT_TILE_GAP,
            WatermarkKind::Image => IMAGE_TILE_GAP,
        }
    }
}

impl WatermarkPosition {
    /// Top-left origin of the content for fixed positions, `None` for tiling.
    pub fn anchor(&self, page: Dimensions, content: Dimensions) -> Option<(i64, i64)> {
        let (pw, ph) = (page.width as i64, page.height as i64);
        let (cw, ch) = (content.width as i64, content.height as i64);
        let right = pw - cw - MARGIN;
        let bottom = ph - ch - MARGIN;
        match self {
            // Floor division so odd leftovers bias toward the top-left.
            WatermarkPosition::Center => Some(((pw - cw).div_euclid(2), (ph - ch).div_euclid(2))),
            WatermarkPosition::TopLeft => Some((MARGIN, MARGIN)),
            WatermarkPosition::TopRight => Some((right, MARGIN)),
            WatermarkPosition::BottomLeft => Some((MARGIN, bottom)),
            WatermarkPosition::BottomRight => Some((right, bottom)),
            WatermarkPosition::Tile => None,
        }
    }
}

/// Compute where a watermark of `content` size goes on a page.
pub fn layout(
    page: Dimensions,
    content: Dimensions,
    position: WatermarkPosition,
    kind: WatermarkKind,
) -> Result<PlacementPlan> {
    page.ensure_positive("page")?;
    content.ensure_positive("watermark")?;

    if let Some((x, y)) = position.anchor(page, content) {
        return Ok(PlacementPlan::Single(Placement {
            x,
            y,
            width: content.width,
            height: content.height,
        }));
    }

    let gap = kind.tile_gap();
    let step_x = content.width + gap;
    let step_y = content.height + gap;
    let limit_x = page.width as u64 + step_x as u64;
    let limit_y = page.height as u64 + step_y as u64;

    let mut placements = Vec::new();
    let mut row: u64 = 0;
    while row * (step_y as u64) < limit_y {
        let mut col: u64 = 0;
        while col * (step_x as u64) < limit_x {
            placements.push(Placement {
                x: (col * step_x as u64) as i64,
                y: (row * step_y as u64) as i64,
                width: content.width,
                height: content.height,
            });
            col += 1;
        }
        row += 1;
    }

    Ok(PlacementPlan::Tiled {
        step_x,
        step_y,
        placements,
    })
}

/// Size of an image watermark after shrinking it to fit the page.
///
/// Never upscales. Each side is limited to [`MAX_IMAGE_FRACTION`] of the
/// page and the aspect ratio is kept; results are floored with a minimum of
/// one pixel.
pub fn scale_to_fit(source: Dimensions, page: Dimensions) -> Result<Dimensions> {
    source.ensure_positive("watermark image")?;
    page.ensure_positive("page")?;

    let max_width = page.width as f64 * MAX_IMAGE_FRACTION;
    let max_height = page.height as f64 * MAX_IMAGE_FRACTION;
    let ratio = (max_width / source.width as f64)
        .min(max_height / source.height as f64)
        .min(1.0);

    // The epsilon absorbs float error such as 1000 * 0.18 = 179.999...
    let scaled = |side: u32| ((side as f64 * ratio + 1e-9).floor() as u32).max(1);
    Ok(Dimensions::new(scaled(source.width), scaled(source.height)))
}
