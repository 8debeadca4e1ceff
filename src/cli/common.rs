//! Project loading and output helpers shared by the commands.

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::{ProjectConfig, RenderConfig};
use crate::core::{Diagnostic, DompileError, Severity};
use crate::pipeline::{RenderPipeline, RenderResult};
use crate::resolver::DependencyTracker;
use crate::storage::FileSystemStore;
use crate::utils::normalize_path;

/// Extensions of files `check` and `deps --dependents` treat as documents
const DOCUMENT_EXTENSIONS: &[&str] = &["html", "htm", "md", "markdown"];

/// A rendered document with its dependency graph.
#[derive(Debug)]
pub struct RenderedDocument {
    pub path: PathBuf,
    pub result: RenderResult,
    pub tracker: DependencyTracker,
}

/// A project directory with its resolved configuration.
#[derive(Debug, Clone)]
pub struct Project {
    dir: PathBuf,
    config: RenderConfig,
    pipeline: Arc<RenderPipeline>,
}

impl Project {
    /// Load `dompile.toml` from `dir` (defaults when absent) and check that
    /// the source root exists.
    pub fn load(dir: &Path) -> Result<Self> {
        let dir = if dir.is_absolute() {
            normalize_path(dir)
        } else {
            let cwd = std::env::current_dir().context("Failed to determine current directory")?;
            normalize_path(&cwd.join(dir))
        };

        let config = ProjectConfig::load(&dir)?.resolve(&dir);
        if !config.source_root.is_dir() {
            return Err(DompileError::SourceRootMissing {
                path: config.source_root.clone(),
            }
            .into());
        }

        tracing::debug!("Project {} with source root {}", dir.display(), config.source_root.display());
        let pipeline = Arc::new(RenderPipeline::new(config.clone(), Arc::new(FileSystemStore)));
        Ok(Self {
            dir,
            config,
            pipeline,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Absolute path for a document argument; relative paths are taken
    /// from the project directory.
    pub fn document_path(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            normalize_path(file)
        } else {
            normalize_path(&self.dir.join(file))
        }
    }

    /// Path as shown to the user, relative to the project directory.
    pub fn display(&self, path: &Path) -> String {
        path.strip_prefix(&self.dir).unwrap_or(path).display().to_string()
    }

    /// Every document under the source root outside the includes
    /// directory, sorted by path.
    pub fn documents(&self) -> Result<Vec<PathBuf>> {
        let includes = self.config.includes_root();
        let mut documents = Vec::new();

        let walker = WalkDir::new(&self.config.source_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.path() != includes);
        for entry in walker {
            let entry = entry.with_context(|| {
                format!("Failed to walk {}", self.config.source_root.display())
            })?;
            if entry.file_type().is_file() && is_document(entry.path()) {
                documents.push(normalize_path(entry.path()));
            }
        }

        tracing::debug!("Found {} documents", documents.len());
        Ok(documents)
    }

    /// Render `paths` concurrently on the blocking pool. Results come back
    /// in argument order.
    pub async fn render_all(&self, paths: Vec<PathBuf>) -> Result<Vec<RenderedDocument>> {
        let tasks = paths.into_iter().map(|path| {
            let pipeline = Arc::clone(&self.pipeline);
            tokio::task::spawn_blocking(move || {
                let (result, tracker) = pipeline.trace_path(&path);
                RenderedDocument {
                    path,
                    result,
                    tracker,
                }
            })
        });

        join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|e| anyhow!("Render task failed: {}", e)))
            .collect()
    }

    /// Print diagnostics to stderr, one per line.
    pub fn print_diagnostics(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            let severity = match diagnostic.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
            };
            eprintln!(
                "{}:{}:{}: {} [{}]: {}",
                self.display(&diagnostic.file),
                diagnostic.range.start.line + 1,
                diagnostic.range.start.character + 1,
                severity,
                diagnostic.category,
                diagnostic.message
            );
            if !diagnostic.suggestions.is_empty() {
                eprintln!("  {} {}", "did you mean:".cyan(), diagnostic.suggestions.join(", "));
            }
        }
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.iter().any(|d| ext.eq_ignore_ascii_case(d)))
}
