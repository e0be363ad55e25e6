//! Project-relative paths
//!
//! Everything mcphub touches locally lives next to the project, except the
//! editor config (see `editor::paths`).

use crate::config::{DESCRIPTOR_FILE_NAME, ENV_FILE_NAME, LATEST_REPORT_FILE_NAME, REPORTS_DIR_NAME};
use crate::error::{errors, McpHubResult};
use std::path::PathBuf;

/// Paths of the files mcphub reads and writes inside a project directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project root (the current directory for the CLI)
    pub root: PathBuf,
    /// `mcphub.json` descriptor
    pub descriptor_file: PathBuf,
    /// `.env` with credentials
    pub env_file: PathBuf,
    /// Directory for analysis reports
    pub reports_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            descriptor_file: root.join(DESCRIPTOR_FILE_NAME),
            env_file: root.join(ENV_FILE_NAME),
            reports_dir: root.join(REPORTS_DIR_NAME),
            root,
        }
    }

    /// Paths rooted at the current working directory.
    pub fn current() -> McpHubResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|err| errors::filesystem_error("Cannot determine current directory", ".", err))?;
        Ok(Self::new(cwd))
    }

    /// The "latest" report, overwritten on each analysis.
    pub fn latest_report(&self) -> PathBuf {
        self.reports_dir.join(LATEST_REPORT_FILE_NAME)
    }

    /// Ensure the reports directory exists.
    pub fn ensure_reports_dir(&self) -> McpHubResult<()> {
        std::fs::create_dir_all(&self.reports_dir).map_err(|err| {
            errors::filesystem_error("Failed to create reports directory", &self.reports_dir, err)
        })
    }

    /// Name of the project directory, used as a default server name.
    pub fn dir_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
