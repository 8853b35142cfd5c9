//! Error types for simplepdf operations.

use thiserror::Error;

/// Main error type for the simplepdf library.
#[derive(Error, Debug)]
pub enum PdfToolError {
    /// The page selector could not be parsed.
    #[error("Invalid page selector '{token}': {reason}")]
    InvalidSelector { token: String, reason: String },

    /// The selector was well-formed but no requested page exists in the document.
    #[error("No valid pages to extract (document has {total_pages} pages)")]
    NoValidPages { total_pages: usize },

    /// Non-positive page or content dimensions reached the layout engine.
    #[error("Invalid watermark geometry: {0}")]
    InvalidGeometry(String),

    /// Both the primary compressor and the fallback rewriter failed.
    #[error("Compression failed: primary ({primary}), fallback ({fallback})")]
    CompressionFailed { primary: String, fallback: String },

    /// A required request parameter is absent.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// A request parameter is present but out of range.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Upload exceeds the configured size limit.
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    /// A PDF operation received something that is not a PDF upload.
    #[error("Only PDF files are allowed, got '{file_name}'")]
    NotPdf { file_name: String },

    /// Unsupported image upload.
    #[error("Unsupported image format: {extension}. Supported: .jpg, .jpeg, .png, .bmp, .tiff, .gif, .webp")]
    UnsupportedImageFormat { extension: String },

    /// The uploaded PDF has no pages.
    #[error("PDF has no pages")]
    EmptyDocument,

    /// lopdf failed to read or write a document.
    #[error("PDF processing failed: {0}")]
    PdfError(String),

    /// Pdfium library error.
    #[error("Pdfium error: {0}")]
    PdfiumError(String),

    /// Image decoding or encoding failed.
    #[error("Image processing failed: {0}")]
    ImageError(String),

    /// No usable font for text watermarks.
    #[error("No usable font found for text watermarks: {0}")]
    FontNotFound(String),

    /// ZIP packaging failed.
    #[error("Archive creation failed: {0}")]
    ArchiveError(String),

    /// Filesystem error in the workspace.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, PdfToolError>;

impl PdfToolError {
    /// Whether the error was caused by the caller's input rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PdfToolError::InvalidSelector { .. }
                | PdfToolError::NoValidPages { .. }
                | PdfToolError::MissingParameter(_)
                | PdfToolError::InvalidParameter { .. }
                | PdfToolError::InputTooLarge { .. }
                | PdfToolError::NotPdf { .. }
                | PdfToolError::UnsupportedImageFormat { .. }
                | PdfToolError::EmptyDocument
        )
    }

    /// Message suitable for returning to a client.
    ///
    /// Client errors keep their full detail (including the offending selector
    /// token). Internal errors collapse to a generic message.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            return self.to_string();
        }
        match self {
            PdfToolError::CompressionFailed { .. } => "Compression failed".to_string(),
            PdfToolError::PdfError(_) => "Failed to process PDF".to_string(),
            _ => "Internal processing error".to_string(),
        }
    }
}

impl From<lopdf::Error> for PdfToolError {
    fn from(err: lopdf::Error) -> Self {
        PdfToolError::PdfError(err.to_string())
    }
}

impl From<image::ImageError> for PdfToolError {
    fn from(err: image::ImageError) -> Self {
        PdfToolError::ImageError(err.to_string())
    }
}

impl From<zip::result::ZipError> for PdfToolError {
    fn from(err: zip::result::ZipError) -> Self {
        PdfToolError::ArchiveError(err.to_string())
    }
}
