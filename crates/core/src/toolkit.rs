//! High-level orchestrator tying together the page selector, watermarking,
//! compression, rendering and packaging.
//!
//! Each operation takes its uploads by reference, validates them, and returns
//! the derived artifact as bytes. Intermediate files only exist inside a
//! per-call scratch directory of the configured [`Workspace`].

use crate::archive::package_zip;
use crate::compression::{CompressedPdf, CompressionLevel, CompressionStrategy};
use crate::config::{
    validate_dpi, Archive, ImageFormat, PdfInfo, RenderedPage, SplitPart, ToolkitConfig, Upload,
};
use crate::document::{self, LopdfRewriter};
use crate::error::{PdfToolError, Result};
use crate::ghostscript::GhostscriptCompressor;
use crate::page_spec;
use crate::pdf_renderer::{encode_pages, PdfRenderer, Rasterizer};
use crate::watermark::compositor::flatten;
use crate::watermark::{
    GlyphPainter, Rgb, TextPainter, WatermarkKind, WatermarkSpec, WatermarkStamper,
};
use crate::workspace::Workspace;
use crate::{is_supported_image_extension, MAX_IMAGES_PER_PDF};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Resolution used when turning uploaded images into PDF pages.
const IMAGE_PAGE_DPI: u32 = 100;

/// PDF toolkit.
///
/// Pdfium and the watermark font are bound on first use so operations that
/// need neither keep working on hosts without them.
pub struct PdfToolkit {
    config: ToolkitConfig,
    workspace: Workspace,
    rasterizer: OnceLock<Arc<dyn Rasterizer>>,
    text_painter: OnceLock<Arc<dyn TextPainter>>,
    compression: CompressionStrategy<GhostscriptCompressor, LopdfRewriter>,
    thread_pool: rayon::ThreadPool,
}

impl PdfToolkit {
    /// Create a toolkit with the given configuration.
    pub fn new(config: ToolkitConfig) -> Result<Self> {
        PdfToolkitBuilder::from_config(config).build()
    }

    /// Create a toolkit with default settings.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ToolkitConfig::default())
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn background(&self) -> Rgb {
        let (r, g, b) = self.config.render.background_color;
        Rgb::new(r, g, b)
    }

    fn rasterizer(&self) -> Result<&Arc<dyn Rasterizer>> {
        if let Some(rasterizer) = self.rasterizer.get() {
            return Ok(rasterizer);
        }
        let renderer: Arc<dyn Rasterizer> = Arc::new(PdfRenderer::new()?);
        Ok(self.rasterizer.get_or_init(|| renderer))
    }

    fn text_painter(&self) -> Result<&Arc<dyn TextPainter>> {
        if let Some(painter) = self.text_painter.get() {
            return Ok(painter);
        }
        let painter: Arc<dyn TextPainter> = Arc::new(GlyphPainter::new(&self.config.watermark)?);
        Ok(self.text_painter.get_or_init(|| painter))
    }

    fn check_pdf(&self, upload: &Upload) -> Result<()> {
        upload.ensure_pdf(self.config.workspace.max_upload_bytes)
    }

    /// Split a PDF into one document per selector group.
    ///
    /// Groups keep selector order; pages outside the document are dropped
    /// and groups left empty disappear. Fails with `NoValidPages` when
    /// nothing survives.
    pub fn split(&self, upload: &Upload, selector: &str) -> Result<Vec<SplitPart>> {
        let start = Instant::now();
        self.check_pdf(upload)?;

        let parsed = page_spec::parse(selector)?;
        let source = document::load(&upload.bytes)?;
        let total_pages = source.get_pages().len();
        info!(
            "Splitting {:?} ({} pages) with selector '{}'",
            upload.file_name, total_pages, selector
        );

        let groups = parsed.retain_in_range(total_pages).require_pages(total_pages)?;
        let mut parts = Vec::with_capacity(groups.len());
        for group in groups {
            let data = document::extract_pages(&source, &group.requested_indices())?;
            debug!(label = %group.label, pages = group.len(), "Extracted group");
            parts.push(SplitPart {
                file_name: group.output_file_name(),
                page_numbers: group.page_numbers(),
                data,
            });
        }

        info!("Split into {} files in {:?}", parts.len(), start.elapsed());
        Ok(parts)
    }

    /// Split and package the parts into a ZIP, in group order.
    pub fn split_to_zip(&self, upload: &Upload, selector: &str) -> Result<Archive> {
        let parts = self.split(upload, selector)?;
        let entries: Vec<(&str, &[u8])> = parts
            .iter()
            .map(|p| (p.file_name.as_str(), p.data.as_slice()))
            .collect();
        Ok(Archive {
            file_name: upload.split_archive_name(),
            data: package_zip(&entries)?,
        })
    }

    /// Stamp a watermark on every page.
    ///
    /// Pages are rasterized, stamped in parallel and reassembled into a PDF
    /// of JPEG pages.
    pub fn watermark(&self, upload: &Upload, spec: &WatermarkSpec) -> Result<Vec<u8>> {
        let start = Instant::now();
        self.check_pdf(upload)?;

        let dpi = self.config.watermark.raster_dpi;
        let pages = self.rasterizer()?.render_pages(&upload.bytes, dpi)?;
        if pages.is_empty() {
            return Err(PdfToolError::EmptyDocument);
        }
        info!(
            "Watermarking {:?}: {} pages, {:?} at {:?}",
            upload.file_name,
            pages.len(),
            spec.kind(),
            spec.position
        );

        let painter = match spec.kind() {
            WatermarkKind::Text => Some(self.text_painter()?.as_ref()),
            WatermarkKind::Image => None,
        };
        let stamper = WatermarkStamper::prepare(
            spec,
            painter,
            self.config.watermark.font_scale,
            self.background(),
        )?;
        let stamped = stamper.stamp_all(pages, &self.thread_pool)?;

        let output = document::rasters_to_document(&stamped, dpi, self.config.render.jpeg_quality)?;
        info!("Watermarked {} pages in {:?}", stamped.len(), start.elapsed());
        Ok(output)
    }

    /// Compress a PDF, falling back to a structural rewrite when Ghostscript
    /// is unavailable.
    pub async fn compress(
        &self,
        upload: &Upload,
        level: CompressionLevel,
    ) -> Result<CompressedPdf> {
        self.check_pdf(upload)?;
        let scratch = self.workspace.scratch("compress")?;
        info!("Compressing {:?} at level {:?}", upload.file_name, level);
        self.compression
            .compress(&upload.bytes, level, scratch.path())
            .await
    }

    /// Page count and size of a PDF.
    pub fn info(&self, upload: &Upload) -> Result<PdfInfo> {
        self.check_pdf(upload)?;
        Ok(PdfInfo {
            filename: upload.file_name.clone(),
            pages: document::page_count(&upload.bytes)?,
            size: upload.bytes.len(),
        })
    }

    /// Render every page to an encoded image.
    pub fn pdf_to_images(
        &self,
        upload: &Upload,
        format: ImageFormat,
        dpi: u32,
    ) -> Result<Vec<RenderedPage>> {
        let start = Instant::now();
        self.check_pdf(upload)?;
        validate_dpi(dpi)?;

        let rasters = self.rasterizer()?.render_pages(&upload.bytes, dpi)?;
        if rasters.is_empty() {
            return Err(PdfToolError::EmptyDocument);
        }
        let pages = encode_pages(
            rasters,
            format,
            self.config.render.jpeg_quality,
            self.background(),
            &self.thread_pool,
        )?;
        info!(
            "Rendered {:?} to {} {:?} images at {} DPI in {:?}",
            upload.file_name,
            pages.len(),
            format,
            dpi,
            start.elapsed()
        );
        Ok(pages)
    }

    /// Render every page and package the images as `page_{n}.{ext}`.
    pub fn pdf_to_images_zip(
        &self,
        upload: &Upload,
        format: ImageFormat,
        dpi: u32,
    ) -> Result<Archive> {
        let pages = self.pdf_to_images(upload, format, dpi)?;
        let entries: Vec<(String, &[u8])> = pages
            .iter()
            .map(|p| {
                let name = format!("page_{}.{}", p.page_number, format.extension());
                (name, p.data.as_slice())
            })
            .collect();
        Ok(Archive {
            file_name: upload.images_archive_name(),
            data: package_zip(&entries)?,
        })
    }

    /// One PDF page per image, in upload order.
    pub fn images_to_pdf(&self, uploads: &[Upload]) -> Result<Vec<u8>> {
        if uploads.is_empty() {
            return Err(PdfToolError::MissingParameter("No files uploaded".to_string()));
        }
        if uploads.len() > MAX_IMAGES_PER_PDF {
            return Err(PdfToolError::InvalidParameter {
                name: "files".to_string(),
                message: format!("Max {} images allowed", MAX_IMAGES_PER_PDF),
            });
        }
        for upload in uploads {
            let extension = upload.extension().unwrap_or_default();
            if !is_supported_image_extension(&extension) {
                return Err(PdfToolError::UnsupportedImageFormat {
                    extension: format!(".{}", extension),
                });
            }
            upload.ensure_size(self.config.workspace.max_upload_bytes)?;
        }

        let background = self.background();
        let mut rasters = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let decoded = image::load_from_memory(&upload.bytes).map_err(|e| {
                PdfToolError::ImageError(format!("cannot decode {}: {}", upload.file_name, e))
            })?;
            debug!(
                file = %upload.file_name,
                width = decoded.width(),
                height = decoded.height(),
                "Decoded image"
            );
            rasters.push(flatten(&decoded.into_rgba8(), background));
        }

        let output = document::rasters_to_document(
            &rasters,
            IMAGE_PAGE_DPI,
            self.config.render.jpeg_quality,
        )?;
        info!("Converted {} images to PDF", rasters.len());
        Ok(output)
    }

    /// Concatenate PDFs in upload order. Non-PDF uploads are skipped.
    pub fn merge(&self, uploads: &[Upload]) -> Result<Vec<u8>> {
        if uploads.len() < 2 {
            return Err(PdfToolError::InvalidParameter {
                name: "files".to_string(),
                message: "At least 2 files required".to_string(),
            });
        }

        let mut documents = Vec::with_capacity(uploads.len());
        for upload in uploads {
            if upload.extension().as_deref() != Some("pdf") {
                warn!("Skipping non-PDF upload {:?} in merge", upload.file_name);
                continue;
            }
            upload.ensure_size(self.config.workspace.max_upload_bytes)?;
            documents.push(document::load(&upload.bytes)?);
        }
        if documents.is_empty() {
            return Err(PdfToolError::MissingParameter("No PDF files to merge".to_string()));
        }

        info!("Merging {} PDFs", documents.len());
        document::merge(&documents)
    }
}

/// Builder for creating a PdfToolkit with custom settings.
pub struct PdfToolkitBuilder {
    config: ToolkitConfig,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    text_painter: Option<Arc<dyn TextPainter>>,
}

impl PdfToolkitBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ToolkitConfig::default())
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ToolkitConfig) -> Self {
        Self {
            config,
            rasterizer: None,
            text_painter: None,
        }
    }

    /// Set the scratch root directory.
    pub fn workspace_root(mut self, root: PathBuf) -> Self {
        self.config.workspace.root = Some(root);
        self
    }

    /// Set the upload size limit.
    pub fn max_upload_bytes(mut self, limit: usize) -> Self {
        self.config.workspace.max_upload_bytes = limit;
        self
    }

    /// Set the number of threads used for per-page work.
    pub fn render_threads(mut self, threads: usize) -> Self {
        self.config.render.render_threads = threads;
        self
    }

    /// Set the JPEG quality of reassembled pages.
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.render = self.config.render.jpeg_quality(quality);
        self
    }

    /// Set the path to the Ghostscript binary.
    pub fn ghostscript_path(mut self, path: PathBuf) -> Self {
        self.config.compression.ghostscript_path = Some(path);
        self
    }

    /// Set the Ghostscript timeout.
    pub fn compression_timeout(mut self, timeout: Duration) -> Self {
        self.config.compression.timeout = timeout;
        self
    }

    /// Set the font used for text watermarks.
    pub fn font_path(mut self, path: PathBuf) -> Self {
        self.config.watermark.font_path = Some(path);
        self
    }

    /// Use a specific rasterizer instead of binding pdfium.
    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Use a specific text painter instead of loading a font file.
    pub fn text_painter(mut self, painter: Arc<dyn TextPainter>) -> Self {
        self.text_painter = Some(painter);
        self
    }

    /// Build the toolkit.
    pub fn build(self) -> Result<PdfToolkit> {
        self.config.validate()?;
        let workspace = Workspace::new(&self.config.workspace)?;

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.render.render_threads)
            .build()
            .map_err(|e| {
                PdfToolError::InvalidConfig(format!("Failed to create thread pool: {}", e))
            })?;

        let compression = CompressionStrategy::new(
            GhostscriptCompressor::locate(&self.config.compression),
            LopdfRewriter::new(self.config.compression.producer.clone()),
        );

        let rasterizer = OnceLock::new();
        if let Some(r) = self.rasterizer {
            let _ = rasterizer.set(r);
        }
        let text_painter = OnceLock::new();
        if let Some(p) = self.text_painter {
            let _ = text_painter.set(p);
        }

        info!(
            "PDF toolkit initialized: workspace {:?}, {} threads",
            workspace.root(),
            self.config.render.render_threads
        );

        Ok(PdfToolkit {
            config: self.config,
            workspace,
            rasterizer,
            text_painter,
            compression,
            thread_pool,
        })
    }
}

impl Default for PdfToolkitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_pdf;
    use crate::watermark::{Dimensions, WatermarkPosition};
    use image::{ImageFormat as Codec, Rgba, RgbaImage};
    use std::io::Cursor;

    /// One white 200x100 raster per page, counted with lopdf.
    struct BlankRasterizer;

    impl Rasterizer for BlankRasterizer {
        fn render_pages(&self, pdf: &[u8], _dpi: u32) -> Result<Vec<RgbaImage>> {
            let pages = document::page_count(pdf)?;
            Ok((0..pages)
                .map(|_| RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255])))
                .collect())
        }
    }

    struct BoxPainter;

    impl TextPainter for BoxPainter {
        fn measure(&self, text: &str, px_size: f32) -> Result<Dimensions> {
            Ok(Dimensions::new(text.len() as u32 * 4, px_size as u32))
        }

        fn paint(&self, text: &str, px_size: f32, color: Rgb, opacity: f32) -> Result<RgbaImage> {
            let dims = self.measure(text, px_size)?;
            let alpha = (255.0 * opacity).round() as u8;
            Ok(RgbaImage::from_pixel(
                dims.width,
                dims.height,
                Rgba([color.r, color.g, color.b, alpha]),
            ))
        }
    }

    fn toolkit(root: &std::path::Path) -> PdfToolkit {
        PdfToolkitBuilder::new()
            .workspace_root(root.to_path_buf())
            .render_threads(2)
            .ghostscript_path(PathBuf::from("/nonexistent/gs"))
            .rasterizer(Arc::new(BlankRasterizer))
            .text_painter(Arc::new(BoxPainter))
            .build()
            .unwrap()
    }

    fn png(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::from_pixel(width, height, pixel)
            .write_to(&mut out, Codec::Png)
            .unwrap();
        out.into_inner()
    }

    // ========== Builder tests ==========

    #[test]
    fn test_builder_defaults() {
        let builder = PdfToolkitBuilder::new();
        assert_eq!(builder.config.render.dpi, 150);
        assert_eq!(builder.config.compression.timeout.as_secs(), 120);
        assert!(builder.rasterizer.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let builder = PdfToolkitBuilder::new()
            .max_upload_bytes(1024)
            .jpeg_quality(80)
            .compression_timeout(Duration::from_secs(5))
            .font_path(PathBuf::from("/fonts/a.ttf"));
        assert_eq!(builder.config.workspace.max_upload_bytes, 1024);
        assert_eq!(builder.config.render.jpeg_quality, 80);
        assert_eq!(builder.config.compression.timeout.as_secs(), 5);
        assert_eq!(builder.config.watermark.font_path, Some(PathBuf::from("/fonts/a.ttf")));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfToolkitBuilder::new()
            .workspace_root(dir.path().to_path_buf())
            .render_threads(0)
            .build();
        assert!(matches!(result, Err(PdfToolError::InvalidConfig(_))));
    }

    // ========== Operation tests ==========

    #[test]
    fn test_split_names_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let upload = Upload::new("doc.pdf", sample_pdf(4));

        let parts = kit.split(&upload, "3, 1-2, 9, 2-10").unwrap();
        let names: Vec<&str> = parts.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, vec!["page_3.pdf", "pages_1-2.pdf", "pages_2-4.pdf"]);
        assert_eq!(parts[2].page_numbers, vec![2, 3, 4]);
        assert_eq!(document::page_count(&parts[1].data).unwrap(), 2);
    }

    #[test]
    fn test_split_errors() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let upload = Upload::new("doc.pdf", sample_pdf(3));

        assert!(matches!(
            kit.split(&upload, "5-2"),
            Err(PdfToolError::InvalidSelector { .. })
        ));
        assert!(matches!(
            kit.split(&upload, "99"),
            Err(PdfToolError::NoValidPages { total_pages: 3 })
        ));
        assert!(matches!(
            kit.split(&Upload::new("doc.txt", sample_pdf(3)), "1"),
            Err(PdfToolError::NotPdf { .. })
        ));
    }

    #[test]
    fn test_watermark_text_produces_pdf_with_same_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let spec =
            WatermarkSpec::text("DRAFT", 10, Rgb::BLACK, WatermarkPosition::Tile, 0.5).unwrap();
        let out = kit.watermark(&Upload::new("doc.pdf", sample_pdf(3)), &spec).unwrap();
        assert_eq!(document::page_count(&out).unwrap(), 3);
    }

    #[test]
    fn test_watermark_image() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let source = image::load_from_memory(&png(40, 40, Rgba([255, 0, 0, 255])))
            .unwrap()
            .into_rgba8();
        let spec = WatermarkSpec::image(source, WatermarkPosition::BottomRight, 0.8).unwrap();
        let out = kit.watermark(&Upload::new("doc.pdf", sample_pdf(2)), &spec).unwrap();
        assert_eq!(document::page_count(&out).unwrap(), 2);
    }

    #[test]
    fn test_watermark_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let spec =
            WatermarkSpec::text("X", 10, Rgb::BLACK, WatermarkPosition::Center, 0.5).unwrap();
        assert!(matches!(
            kit.watermark(&Upload::new("notes.txt", b"hello".to_vec()), &spec),
            Err(PdfToolError::NotPdf { .. })
        ));
    }

    #[tokio::test]
    async fn test_compress_without_ghostscript_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let upload = Upload::new("doc.pdf", sample_pdf(2));
        let result = kit.compress(&upload, CompressionLevel::High).await.unwrap();
        assert_eq!(
            result.outcome.method_used,
            crate::compression::CompressionMethod::Fallback
        );
        assert_eq!(result.outcome.original_size, upload.bytes.len());
        assert_eq!(document::page_count(&result.data).unwrap(), 2);
    }

    #[test]
    fn test_info() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let bytes = sample_pdf(5);
        let size = bytes.len();
        let info = kit.info(&Upload::new("report.pdf", bytes)).unwrap();
        assert_eq!(
            info,
            PdfInfo {
                filename: "report.pdf".to_string(),
                pages: 5,
                size,
            }
        );
    }

    #[test]
    fn test_upload_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let kit = PdfToolkitBuilder::new()
            .workspace_root(dir.path().to_path_buf())
            .max_upload_bytes(10)
            .build()
            .unwrap();
        assert!(matches!(
            kit.info(&Upload::new("big.pdf", vec![0; 11])),
            Err(PdfToolError::InputTooLarge { size: 11, limit: 10 })
        ));
    }

    #[test]
    fn test_pdf_to_images_names_and_dpi_validation() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let upload = Upload::new("doc.pdf", sample_pdf(2));

        assert!(matches!(
            kit.pdf_to_images(&upload, ImageFormat::Png, 600),
            Err(PdfToolError::InvalidParameter { .. })
        ));

        let pages = kit.pdf_to_images(&upload, ImageFormat::Png, 150).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].page_number, 2);

        let zip = kit.pdf_to_images_zip(&upload, ImageFormat::Jpeg, 72).unwrap();
        assert_eq!(zip.file_name, "doc_images.zip");
        let archive = zip::ZipArchive::new(Cursor::new(zip.data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"page_1.jpg"));
        assert!(names.contains(&"page_2.jpg"));
    }

    #[test]
    fn test_images_to_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let uploads = vec![
            Upload::new("a.png", png(30, 20, Rgba([0, 0, 0, 0]))),
            Upload::new("b.PNG", png(10, 10, Rgba([0, 255, 0, 255]))),
        ];
        let out = kit.images_to_pdf(&uploads).unwrap();
        assert_eq!(document::page_count(&out).unwrap(), 2);
    }

    #[test]
    fn test_images_to_pdf_validation() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());

        assert!(matches!(
            kit.images_to_pdf(&[]),
            Err(PdfToolError::MissingParameter(_))
        ));

        let too_many: Vec<Upload> = (0..21)
            .map(|i| Upload::new(format!("{}.png", i), png(1, 1, Rgba([0, 0, 0, 255]))))
            .collect();
        assert!(matches!(
            kit.images_to_pdf(&too_many),
            Err(PdfToolError::InvalidParameter { .. })
        ));

        match kit.images_to_pdf(&[Upload::new("scan.svg", b"<svg/>".to_vec())]) {
            Err(PdfToolError::UnsupportedImageFormat { extension }) => {
                assert_eq!(extension, ".svg")
            }
            other => panic!("Expected UnsupportedImageFormat, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_merge_skips_non_pdf_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        let uploads = vec![
            Upload::new("a.pdf", sample_pdf(1)),
            Upload::new("notes.txt", b"skip me".to_vec()),
            Upload::new("b.pdf", sample_pdf(2)),
        ];
        let out = kit.merge(&uploads).unwrap();
        assert_eq!(document::page_count(&out).unwrap(), 3);
    }

    #[test]
    fn test_merge_requires_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let kit = toolkit(dir.path());
        assert!(matches!(
            kit.merge(&[Upload::new("a.pdf", sample_pdf(1))]),
            Err(PdfToolError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kit.merge(&[
                Upload::new("a.txt", vec![]),
                Upload::new("b.txt", vec![])
            ]),
            Err(PdfToolError::MissingParameter(_))
        ));
    }
}
