//! Ghostscript as the primary compressor.

use crate::compression::{CompressionLevel, PrimaryCompressor, PrimaryUnavailable};
use crate::config::CompressionConfig;
use async_process::Command;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs `gs -sDEVICE=pdfwrite` with a `-dPDFSETTINGS` preset.
#[derive(Debug, Clone)]
pub struct GhostscriptCompressor {
    /// `None` when no binary was found; every call then reports `Missing`.
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl GhostscriptCompressor {
    /// Resolve the Ghostscript binary from the config or `PATH`.
    ///
    /// A missing binary is not an error; compression will go straight to the
    /// fallback.
    pub fn locate(config: &CompressionConfig) -> Self {
        let binary = find_ghostscript(config);
        match &binary {
            Some(path) => info!("Using Ghostscript at {:?}", path),
            None => warn!("Ghostscript not found, compression will use the fallback rewriter"),
        }
        Self {
            binary,
            timeout: config.timeout,
        }
    }

    /// Use a specific binary.
    pub fn with_binary(binary: PathBuf, timeout: Duration) -> Self {
        Self {
            binary: Some(binary),
            timeout,
        }
    }

    /// Whether a binary was found.
    pub fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    /// Arguments for one run.
    pub fn arguments(input: &Path, output: &Path, level: CompressionLevel) -> Vec<String> {
        vec![
            "-sDEVICE=pdfwrite".to_string(),
            "-dCompatibilityLevel=1.4".to_string(),
            format!("-dPDFSETTINGS={}", level.preset()),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-dBATCH".to_string(),
            "-dColorImageDownsampleType=/Bicubic".to_string(),
            "-dGrayImageDownsampleType=/Bicubic".to_string(),
            "-dMonoImageDownsampleType=/Bicubic".to_string(),
            format!("-sOutputFile={}", output.display()),
            input.display().to_string(),
        ]
    }
}

fn find_ghostscript(config: &CompressionConfig) -> Option<PathBuf> {
    if let Some(ref path) = config.ghostscript_path {
        if path.exists() {
            return Some(path.clone());
        }
        warn!("Configured Ghostscript path {:?} does not exist", path);
        return None;
    }

    which::which("gs")
        .or_else(|_| which::which("gswin64c"))
        .or_else(|_| which::which("gswin32c"))
        .ok()
}

impl PrimaryCompressor for GhostscriptCompressor {
    async fn compress(
        &self,
        input: &Path,
        output: &Path,
        level: CompressionLevel,
    ) -> Result<(), PrimaryUnavailable> {
        let binary = self.binary.as_ref().ok_or(PrimaryUnavailable::Missing)?;
        let start = Instant::now();

        let mut cmd = Command::new(binary);
        cmd.args(Self::arguments(input, output, level));
        cmd.kill_on_drop(true);

        let result = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| PrimaryUnavailable::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(PrimaryUnavailable::Io)?;

        if !result.status.success() {
            return Err(PrimaryUnavailable::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        if !output.exists() {
            return Err(PrimaryUnavailable::NoOutput);
        }

        debug!("Ghostscript {} finished in {:?}", level.preset(), start.elapsed());
        Ok(())
    }
}
