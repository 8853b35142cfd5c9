//! PDF page rasterization using pdfium (Google's PDF engine).
//!
//! Rendering itself is sequential because a pdfium document is not
//! thread-safe; encoding of the rendered pages is parallelized with rayon.

use crate::config::{ImageFormat, RenderedPage};
use crate::error::{PdfToolError, Result};
use crate::watermark::compositor::flatten;
use crate::watermark::Rgb;
use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};
use pdfium_render::prelude::*;
use rayon::prelude::*;
use std::io::Cursor;
use std::time::Instant;
use tracing::{debug, error, info};

/// Turns PDF pages into rasters.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `pdf` at `dpi`, in page order.
    fn render_pages(&self, pdf: &[u8], dpi: u32) -> Result<Vec<RgbaImage>>;
}

/// [`Rasterizer`] backed by pdfium.
pub struct PdfRenderer {
    pdfium: Pdfium,
}

impl PdfRenderer {
    /// Bind to the pdfium library.
    ///
    /// Looks next to the executable first, then in the usual system library
    /// directories.
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("/usr/lib"))
            })
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                    "/usr/local/lib",
                ))
            })
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| {
                PdfToolError::PdfiumError(format!("Failed to load pdfium library: {}", e))
            })?;

        info!("Pdfium rasterizer initialized");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl Rasterizer for PdfRenderer {
    fn render_pages(&self, pdf: &[u8], dpi: u32) -> Result<Vec<RgbaImage>> {
        let start = Instant::now();
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| PdfToolError::PdfiumError(format!("Failed to load PDF: {}", e)))?;

        let page_count = document.pages().len() as usize;
        let scale = dpi as f32 / 72.0;
        let mut rasters = Vec::with_capacity(page_count);

        for page_idx in 0..page_count {
            let page = document.pages().get(page_idx as u16).map_err(|e| {
                PdfToolError::PdfiumError(format!("Failed to get page {}: {}", page_idx + 1, e))
            })?;

            let width = (page.width().value * scale) as i32;
            let height = (page.height().value * scale) as i32;
            let render_config = PdfRenderConfig::new()
                .set_target_width(width.max(1))
                .set_target_height(height.max(1))
                .rotate_if_landscape(PdfPageRenderRotation::None, false);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                PdfToolError::PdfiumError(format!("Failed to render page {}: {}", page_idx + 1, e))
            })?;
            rasters.push(bitmap.as_image().into_rgba8());
        }

        debug!("Rendered {} pages at {} DPI in {:?}", page_count, dpi, start.elapsed());
        Ok(rasters)
    }
}

/// Flatten and encode rendered pages in parallel, keeping page order.
pub fn encode_pages(
    rasters: Vec<RgbaImage>,
    format: ImageFormat,
    jpeg_quality: u8,
    background: Rgb,
    pool: &rayon::ThreadPool,
) -> Result<Vec<RenderedPage>> {
    let encoded: Vec<Result<RenderedPage>> = pool.install(|| {
        rasters
            .into_par_iter()
            .enumerate()
            .map(|(idx, raster)| {
                let rgb = flatten(&raster, background);
                let data = match format {
                    ImageFormat::Jpeg => encode_jpeg(&rgb, jpeg_quality)?,
                    ImageFormat::Png => encode_png(&rgb)?,
                };
                Ok(RenderedPage {
                    page_number: idx + 1,
                    data,
                    width: rgb.width(),
                    height: rgb.height(),
                })
            })
            .collect()
    });

    let mut pages = Vec::with_capacity(encoded.len());
    for result in encoded {
        match result {
            Ok(page) => pages.push(page),
            Err(e) => {
                error!("Failed to encode page: {:?}", e);
                return Err(e);
            }
        }
    }
    Ok(pages)
}

/// Encode an RGB image as JPEG.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).encode_image(image)?;
    Ok(buffer)
}

/// Encode an RGB image as PNG with the png crate.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);

    let mut writer = encoder
        .write_header()
        .map_err(|e| PdfToolError::ImageError(format!("Failed to write PNG header: {}", e)))?;
    writer
        .write_image_data(image.as_raw())
        .map_err(|e| PdfToolError::ImageError(format!("Failed to write PNG data: {}", e)))?;
    drop(writer);

    Ok(buffer.into_inner())
}
