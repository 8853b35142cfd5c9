//! Applies one watermark to a sequence of page rasters.

use super::compositor::{apply_opacity, composite, flatten, OverlayDraw};
use super::layout::{layout, scale_to_fit, Dimensions};
use super::text::{ensure_canvas_fits, TextPainter};
use super::{Rgb, WatermarkContent, WatermarkKind, WatermarkPosition, WatermarkSpec};
use crate::error::{PdfToolError, Result};
use image::imageops::{self, FilterType};
use image::{RgbImage, RgbaImage};
use rayon::prelude::*;
use std::borrow::Cow;
use tracing::debug;

enum Overlay {
    /// Painted once; text does not depend on the page size.
    Text(RgbaImage),
    /// Source image; scaled per page.
    Image { source: RgbaImage, opacity: f32 },
}

/// Prepared watermark ready to stamp pages.
pub struct WatermarkStamper {
    overlay: Overlay,
    kind: WatermarkKind,
    position: WatermarkPosition,
    background: Rgb,
}

impl WatermarkStamper {
    /// Prepare a stamper. Text is painted here at `font_size * font_scale` pixels.
    pub fn prepare(
        spec: &WatermarkSpec,
        painter: Option<&dyn TextPainter>,
        font_scale: f32,
        background: Rgb,
    ) -> Result<Self> {
        let overlay = match &spec.content {
            WatermarkContent::Text {
                content,
                font_size,
                color,
            } => {
                let painter = painter.ok_or_else(|| {
                    PdfToolError::FontNotFound("no text painter available".to_string())
                })?;
                let px_size = *font_size as f32 * font_scale;
                ensure_canvas_fits(painter.measure(content, px_size)?)?;
                Overlay::Text(painter.paint(content, px_size, *color, spec.opacity)?)
            }
            WatermarkContent::Image { source } => Overlay::Image {
                source: source.clone(),
                opacity: spec.opacity,
            },
        };

        Ok(Self {
            overlay,
            kind: spec.kind(),
            position: spec.position,
            background,
        })
    }

    /// Overlay sized for a page of `page` dimensions.
    fn overlay_for(&self, page: Dimensions) -> Result<Cow<'_, RgbaImage>> {
        match &self.overlay {
            Overlay::Text(image) => Ok(Cow::Borrowed(image)),
            Overlay::Image { source, opacity } => {
                let target = scale_to_fit(Dimensions::new(source.width(), source.height()), page)?;
                let mut scaled = if (target.width, target.height) == source.dimensions() {
                    source.clone()
                } else {
                    imageops::resize(source, target.width, target.height, FilterType::Lanczos3)
                };
                apply_opacity(&mut scaled, *opacity);
                Ok(Cow::Owned(scaled))
            }
        }
    }

    /// Stamp one page and flatten it to RGB.
    pub fn stamp(&self, page: RgbaImage) -> Result<RgbImage> {
        let page_dims = Dimensions::new(page.width(), page.height());
        let overlay = self.overlay_for(page_dims)?;
        let content = Dimensions::new(overlay.width(), overlay.height());
        let plan = layout(page_dims, content, self.position, self.kind)?;

        let draws: Vec<OverlayDraw<'_>> = plan
            .placements()
            .iter()
            .map(|placement| OverlayDraw {
                overlay: &*overlay,
                placement: *placement,
            })
            .collect();
        debug!(
            width = page_dims.width,
            height = page_dims.height,
            boxes = draws.len(),
            "Stamping page"
        );

        Ok(flatten(&composite(page, &draws), self.background))
    }

    /// Stamp every page in parallel on `pool`, keeping page order.
    pub fn stamp_all(
        &self,
        pages: Vec<RgbaImage>,
        pool: &rayon::ThreadPool,
    ) -> Result<Vec<RgbImage>> {
        pool.install(|| pages.into_par_iter().map(|page| self.stamp(page)).collect())
    }
}
