//! # simplepdf-core
//!
//! PDF toolkit library: split by page selector, watermark, compress, and
//! convert between PDFs and images.
//!
//! The library is built on:
//!
//! - **lopdf** for page extraction, merging and reassembly
//! - **pdfium** (Google's PDF engine) for page rasterization
//! - **Ghostscript** for compression, with an in-process lopdf fallback
//! - **rayon** for parallel per-page stamping and encoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simplepdf_core::{PdfToolkit, ToolkitConfig, Upload};
//!
//! fn main() -> anyhow::Result<()> {
//!     let toolkit = PdfToolkit::new(ToolkitConfig::with_workspace_root("/tmp/simplepdf"))?;
//!
//!     let upload = Upload::new("report.pdf", std::fs::read("report.pdf")?);
//!     let archive = toolkit.split_to_zip(&upload, "1,3,5-10")?;
//!
//!     std::fs::write(&archive.file_name, archive.data)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Compression with Fallback
//!
//! ```rust,no_run
//! use simplepdf_core::{CompressionLevel, PdfToolkit, Upload};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let toolkit = PdfToolkit::with_defaults()?;
//!     let upload = Upload::new("scan.pdf", std::fs::read("scan.pdf")?);
//!
//!     let compressed = toolkit.compress(&upload, CompressionLevel::Medium).await?;
//!     for (name, value) in compressed.outcome.headers() {
//!         println!("{}: {}", name, value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod compression;
pub mod config;
pub mod document;
pub mod error;
pub mod ghostscript;
pub mod page_spec;
pub mod pdf_renderer;
pub mod toolkit;
pub mod watermark;
pub mod workspace;

// Re-export main types for convenience
pub use archive::package_zip;
pub use compression::{
    CompressedPdf, CompressionLevel, CompressionMethod, CompressionOutcome, CompressionStrategy,
    FallbackRewriter, PrimaryCompressor, PrimaryUnavailable,
};
pub use config::{
    Archive, CompressionConfig, ImageFormat, PdfInfo, RenderConfig, RenderedPage, SplitPart,
    ToolkitConfig, Upload, WatermarkConfig, WorkspaceConfig,
};
pub use document::LopdfRewriter;
pub use error::{PdfToolError, Result};
pub use ghostscript::GhostscriptCompressor;
pub use page_spec::{filter_valid, PageGroup, PageSelector};
pub use pdf_renderer::{PdfRenderer, Rasterizer};
pub use toolkit::{PdfToolkit, PdfToolkitBuilder};
pub use watermark::{
    Dimensions, GlyphPainter, Placement, PlacementPlan, Rgb, TextPainter, WatermarkKind,
    WatermarkOptions, WatermarkPosition, WatermarkSpec,
};
pub use workspace::Workspace;

/// Image extensions accepted by `images_to_pdf`.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "tiff", "gif", "webp"];

/// Maximum number of images combined into one PDF.
pub const MAX_IMAGES_PER_PDF: usize = 20;

/// Check if an image extension is supported.
pub fn is_supported_image_extension(ext: &str) -> bool {
    SUPPORTED_IMAGE_EXTENSIONS
        .iter()
        .any(|&e| e.eq_ignore_ascii_case(ext))
}

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_image_extensions() {
        for ext in ["jpg", "JPEG", "png", "bmp", "tiff", "gif", "WebP"] {
            assert!(is_supported_image_extension(ext), "{} should be supported", ext);
        }
        for ext in ["svg", "pdf", "tif", ""] {
            assert!(!is_supported_image_extension(ext), "{} should not be supported", ext);
        }
    }
}
