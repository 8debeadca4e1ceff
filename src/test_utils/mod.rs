//! Test utilities for dompile
//!
//! Helpers shared by unit tests and the integration suites: one-time
//! tracing setup and [`SiteFixture`], a throwaway project directory with a
//! `src/` source root.
//!
//! # Example
//!
//! ```rust,no_run
//! use dompile::test_utils::SiteFixture;
//!
//! let site = SiteFixture::new().unwrap();
//! site.write("src/includes/nav.html", "<nav></nav>").unwrap();
//! site.write("src/index.html", "<!--#include virtual=\"/includes/nav.html\" -->").unwrap();
//!
//! let result = site.pipeline().render_path(&site.source("index.html"));
//! assert_eq!(result.html, "<nav></nav>");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{ProjectConfig, RenderConfig};
use crate::pipeline::RenderPipeline;
use crate::storage::FileSystemStore;
use crate::utils::normalize_path;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=dompile=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// A project directory in a temp dir, with `src/` as the source root.
pub struct SiteFixture {
    _temp: TempDir,
    dir: PathBuf,
}

impl SiteFixture {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let dir = normalize_path(temp.path());
        std::fs::create_dir_all(dir.join("src")).context("Failed to create source root")?;
        Ok(Self { _temp: temp, dir })
    }

    /// Project directory (where `dompile.toml` goes).
    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn source_root(&self) -> PathBuf {
        self.dir.join("src")
    }

    /// Absolute path of a file under the source root.
    pub fn source(&self, relative: &str) -> PathBuf {
        self.source_root().join(relative)
    }

    /// Write `content` to `relative` (from the project directory), creating
    /// parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_config(&self, toml: &str) -> Result<PathBuf> {
        self.write(crate::config::CONFIG_FILE_NAME, toml)
    }

    /// Configuration as the CLI would load it.
    pub fn config(&self) -> Result<RenderConfig> {
        Ok(ProjectConfig::load(&self.dir)?.resolve(&self.dir))
    }

    /// Pipeline over the real filesystem using the project's configuration,
    /// or defaults when the configuration is invalid.
    pub fn pipeline(&self) -> RenderPipeline {
        let config = self.config().unwrap_or_else(|_| RenderConfig::new(self.source_root()));
        RenderPipeline::new(config, Arc::new(FileSystemStore))
    }
}
