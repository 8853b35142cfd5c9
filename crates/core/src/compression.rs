//! Two-tier PDF compression.
//!
//! The primary compressor is an external optimizer (Ghostscript); when it is
//! missing, times out, exits non-zero or produces nothing, the strategy falls
//! back to an in-process structural rewrite. Only when both tiers fail is an
//! error returned.

use crate::error::{PdfToolError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Requested compression level.
///
/// The naming follows the level of *compression*, not of quality: `High`
/// selects the `/screen` preset and yields the smallest, lowest-fidelity
/// output, while `Low` selects `/printer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    /// Ghostscript `-dPDFSETTINGS` preset for this level.
    pub fn preset(&self) -> &'static str {
        match self {
            CompressionLevel::Low => "/printer",
            CompressionLevel::Medium => "/ebook",
            CompressionLevel::High => "/screen",
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = PdfToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(CompressionLevel::Low),
            "medium" => Ok(CompressionLevel::Medium),
            "high" => Ok(CompressionLevel::High),
            other => Err(PdfToolError::InvalidParameter {
                name: "level".to_string(),
                message: format!("level must be low, medium or high, got '{}'", other),
            }),
        }
    }
}

/// Which tier produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    Primary,
    Fallback,
}

/// Size report for one compression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub method_used: CompressionMethod,
    pub original_size: usize,
    pub result_size: usize,
    /// `(1 - result/original) * 100`; negative when the output grew.
    pub ratio_percent: f64,
}

impl CompressionOutcome {
    pub fn new(method_used: CompressionMethod, original_size: usize, result_size: usize) -> Self {
        let ratio_percent = if original_size == 0 {
            0.0
        } else {
            (1.0 - result_size as f64 / original_size as f64) * 100.0
        };
        Self {
            method_used,
            original_size,
            result_size,
            ratio_percent,
        }
    }

    /// Response headers describing the outcome.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("X-Original-Size", self.original_size.to_string()),
            ("X-Compressed-Size", self.result_size.to_string()),
            ("X-Compression-Ratio", format!("{:.1}", self.ratio_percent)),
        ]
    }
}

/// Compressed document plus its size report.
#[derive(Debug, Clone)]
pub struct CompressedPdf {
    pub data: Vec<u8>,
    pub outcome: CompressionOutcome,
}

/// Reasons the primary compressor could not produce output. None of these
/// are errors for the caller; they all route to the fallback.
#[derive(Error, Debug)]
pub enum PrimaryUnavailable {
    #[error("compressor binary not found")]
    Missing,

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("no output file produced")]
    NoOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// External optimizing compressor working on files.
pub trait PrimaryCompressor: Send + Sync {
    /// Compress `input` into `output` with the preset for `level`. Success
    /// means the tool exited cleanly and `output` exists.
    fn compress(
        &self,
        input: &Path,
        output: &Path,
        level: CompressionLevel,
    ) -> impl Future<Output = std::result::Result<(), PrimaryUnavailable>> + Send;
}

/// In-process structural rewrite used when the primary tier is unavailable.
pub trait FallbackRewriter: Send + Sync {
    fn rewrite(&self, input: &[u8]) -> Result<Vec<u8>>;
}

enum Attempt {
    TryPrimary,
    TryFallback { primary: String },
    Done(CompressedPdf),
    Failed { primary: String, fallback: String },
}

/// Primary-then-fallback compression.
pub struct CompressionStrategy<P, F> {
    primary: P,
    fallback: F,
}

impl<P: PrimaryCompressor, F: FallbackRewriter> CompressionStrategy<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Compress `input`. Intermediate files are written under `scratch_dir`,
    /// which must be private to this request.
    pub async fn compress(
        &self,
        input: &[u8],
        level: CompressionLevel,
        scratch_dir: &Path,
    ) -> Result<CompressedPdf> {
        let start = Instant::now();
        let mut state = Attempt::TryPrimary;

        loop {
            state = match state {
                Attempt::TryPrimary => match self.run_primary(input, level, scratch_dir).await {
                    Ok(data) => Attempt::Done(CompressedPdf {
                        outcome: CompressionOutcome::new(
                            CompressionMethod::Primary,
                            input.len(),
                            data.len(),
                        ),
                        data,
                    }),
                    Err(reason) => {
                        warn!("Primary compressor unavailable ({}), using fallback", reason);
                        Attempt::TryFallback {
                            primary: reason.to_string(),
                        }
                    }
                },
                Attempt::TryFallback { primary } => match self.fallback.rewrite(input) {
                    Ok(data) => Attempt::Done(CompressedPdf {
                        outcome: CompressionOutcome::new(
                            CompressionMethod::Fallback,
                            input.len(),
                            data.len(),
                        ),
                        data,
                    }),
                    Err(e) => Attempt::Failed {
                        primary,
                        fallback: e.to_string(),
                    },
                },
                Attempt::Done(result) => {
                    info!(
                        "{:?} compression: {} -> {} ({:.1}% reduction) in {:?}",
                        result.outcome.method_used,
                        result.outcome.original_size,
                        result.outcome.result_size,
                        result.outcome.ratio_percent,
                        start.elapsed()
                    );
                    return Ok(result);
                }
                Attempt::Failed { primary, fallback } => {
                    error!("Compression failed: primary: {}; fallback: {}", primary, fallback);
                    return Err(PdfToolError::CompressionFailed { primary, fallback });
                }
            };
        }
    }

    async fn run_primary(
        &self,
        input: &[u8],
        level: CompressionLevel,
        scratch_dir: &Path,
    ) -> std::result::Result<Vec<u8>, PrimaryUnavailable> {
        let input_path = scratch_dir.join("input.pdf");
        let output_path = scratch_dir.join("compressed.pdf");
        tokio::fs::write(&input_path, input).await?;

        debug!(preset = level.preset(), "Running primary compressor");
        self.primary
            .compress(&input_path, &output_path, level)
            .await?;

        tokio::fs::read(&output_path)
            .await
            .map_err(|_| PrimaryUnavailable::NoOutput)
    }
}
