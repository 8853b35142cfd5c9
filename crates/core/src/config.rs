//! Configuration and request/result types for simplepdf operations.

use crate::error::{PdfToolError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default upload limit: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Lowest DPI accepted for page rendering.
pub const MIN_DPI: u32 = 72;

/// Highest DPI accepted for page rendering.
pub const MAX_DPI: u32 = 300;

/// Configuration for the per-request scratch area.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Root directory under which per-request scratch directories are created.
    /// Default: `<system temp>/simplepdf`.
    pub root: Option<PathBuf>,

    /// Maximum accepted upload size in bytes.
    /// Default: 50 MiB.
    pub max_upload_bytes: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl WorkspaceConfig {
    /// Create a workspace config rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Default::default()
        }
    }

    /// Set the upload size limit.
    pub fn max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Root directory, falling back to the system temp directory.
    pub fn resolved_root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("simplepdf"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(PdfToolError::InvalidConfig(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the compression strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Path to the Ghostscript binary. If None, searches PATH.
    pub ghostscript_path: Option<PathBuf>,

    /// Time budget for one Ghostscript run.
    /// Default: 120 seconds.
    pub timeout: Duration,

    /// Producer string written by the fallback rewriter.
    /// Default: "SimplePDF".
    pub producer: String,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            ghostscript_path: None,
            timeout: Duration::from_secs(120),
            producer: "SimplePDF".to_string(),
        }
    }
}

impl CompressionConfig {
    /// Set the Ghostscript binary path.
    pub fn ghostscript_path(mut self, path: PathBuf) -> Self {
        self.ghostscript_path = Some(path);
        self
    }

    /// Set the Ghostscript time budget.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the producer metadata written by the fallback.
    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(PdfToolError::InvalidConfig(
                "compression timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for PDF page rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Default output DPI for page images.
    /// Default: 150.
    pub dpi: u32,

    /// Number of threads for parallel page work (encoding, stamping).
    /// Default: number of CPU cores.
    pub render_threads: usize,

    /// JPEG quality (1-100) for rendered pages and reassembled documents.
    /// Default: 95.
    pub jpeg_quality: u8,

    /// Background color used when flattening transparent rasters.
    /// Default: white (255, 255, 255).
    pub background_color: (u8, u8, u8),
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            render_threads: num_cpus::get(),
            jpeg_quality: 95,
            background_color: (255, 255, 255),
        }
    }
}

impl RenderConfig {
    /// Create a render config with specified DPI.
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Set the number of render threads.
    pub fn render_threads(mut self, threads: usize) -> Self {
        self.render_threads = threads;
        self
    }

    /// Set JPEG quality.
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_dpi(self.dpi).map_err(|_| {
            PdfToolError::InvalidConfig(format!("dpi must be between {} and {}", MIN_DPI, MAX_DPI))
        })?;
        if self.render_threads == 0 {
            return Err(PdfToolError::InvalidConfig(
                "render_threads must be at least 1".to_string(),
            ));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(PdfToolError::InvalidConfig(
                "jpeg_quality must be between 1 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check a requested DPI against the accepted range.
pub fn validate_dpi(dpi: u32) -> Result<()> {
    if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
        return Err(PdfToolError::InvalidParameter {
            name: "dpi".to_string(),
            message: format!("DPI must be between {} and {}", MIN_DPI, MAX_DPI),
        });
    }
    Ok(())
}

/// Configuration for watermark rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// TrueType font for text watermarks. If None, common system locations are searched.
    pub font_path: Option<PathBuf>,

    /// Multiplier from requested font size (points) to raster pixels.
    /// Default: 2.0, matching the 150 DPI page raster.
    pub font_scale: f32,

    /// DPI at which pages are rasterized before stamping.
    /// Default: 150.
    pub raster_dpi: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_scale: 2.0,
            raster_dpi: 150,
        }
    }
}

impl WatermarkConfig {
    /// Set the font file.
    pub fn font_path(mut self, path: PathBuf) -> Self {
        self.font_path = Some(path);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.font_scale > 0.0) {
            return Err(PdfToolError::InvalidConfig(
                "font_scale must be greater than 0".to_string(),
            ));
        }
        validate_dpi(self.raster_dpi).map_err(|_| {
            PdfToolError::InvalidConfig(format!(
                "raster_dpi must be between {} and {}",
                MIN_DPI, MAX_DPI
            ))
        })
    }
}

/// Combined configuration for the toolkit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Scratch area configuration.
    pub workspace: WorkspaceConfig,

    /// Compression configuration.
    pub compression: CompressionConfig,

    /// Render configuration.
    pub render: RenderConfig,

    /// Watermark configuration.
    pub watermark: WatermarkConfig,
}

impl ToolkitConfig {
    /// Create a config whose scratch area lives under `root`.
    pub fn with_workspace_root(root: impl Into<PathBuf>) -> Self {
        Self {
            workspace: WorkspaceConfig::with_root(root),
            ..Default::default()
        }
    }

    /// Parse a config from JSON. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PdfToolError::InvalidConfig(format!("malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.workspace.validate()?;
        self.compression.validate()?;
        self.render.validate()?;
        self.watermark.validate()?;
        Ok(())
    }
}

/// An uploaded file: original filename plus its bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name.
    pub file_name: String,

    /// File content.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create a new upload.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lowercased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string()
    }

    /// Archive name for the parts of a split: `split_{stem}.zip`.
    pub fn split_archive_name(&self) -> String {
        format!("split_{}.zip", self.stem())
    }

    /// Archive name for rendered pages: `{stem}_images.zip`.
    pub fn images_archive_name(&self) -> String {
        format!("{}_images.zip", self.stem())
    }

    /// Check that this is a `.pdf` upload within the size limit.
    pub fn ensure_pdf(&self, max_bytes: usize) -> Result<()> {
        if self.extension().as_deref() != Some("pdf") {
            return Err(PdfToolError::NotPdf {
                file_name: self.file_name.clone(),
            });
        }
        self.ensure_size(max_bytes)
    }

    /// Check the size limit.
    pub fn ensure_size(&self, max_bytes: usize) -> Result<()> {
        if self.bytes.len() > max_bytes {
            return Err(PdfToolError::InputTooLarge {
                size: self.bytes.len(),
                limit: max_bytes,
            });
        }
        Ok(())
    }
}

/// Encoding for rendered page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    /// JPEG (default).
    #[default]
    Jpeg,
    /// PNG.
    Png,
}

impl ImageFormat {
    /// File extension used for output names.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = PdfToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            other => Err(PdfToolError::InvalidParameter {
                name: "format".to_string(),
                message: format!("Format must be jpg or png, got '{}'", other),
            }),
        }
    }
}

/// A single rendered and encoded page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Page number (1-indexed).
    pub page_number: usize,

    /// Encoded image data.
    pub data: Vec<u8>,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,
}

/// A packaged multi-file result.
#[derive(Debug, Clone)]
pub struct Archive {
    /// Suggested download name.
    pub file_name: String,

    /// ZIP bytes.
    pub data: Vec<u8>,
}

/// One PDF produced by a split.
#[derive(Debug, Clone)]
pub struct SplitPart {
    /// File name inside the archive.
    pub file_name: String,

    /// 1-based page numbers copied into this part.
    pub page_numbers: Vec<usize>,

    /// Serialized PDF.
    pub data: Vec<u8>,
}

/// Summary information about an uploaded PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfInfo {
    /// Uploaded file name.
    pub filename: String,

    /// Number of pages.
    pub pages: usize,

    /// Size in bytes.
    pub size: usize,
}
