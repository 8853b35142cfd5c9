//! Per-request scratch directories under an explicit root.

use crate::config::WorkspaceConfig;
use crate::error::{PdfToolError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

/// Root under which each request gets its own scratch directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create the root directory if needed.
    pub fn new(config: &WorkspaceConfig) -> Result<Self> {
        let root = config.resolved_root();
        std::fs::create_dir_all(&root).map_err(|e| {
            PdfToolError::InvalidConfig(format!(
                "cannot create workspace root {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh, uniquely named directory removed when the handle drops.
    pub fn scratch(&self, label: &str) -> Result<TempDir> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-{}-", label, Uuid::new_v4()))
            .tempdir_in(&self.root)?;
        debug!("Created scratch directory {:?}", dir.path());
        Ok(dir)
    }
}
