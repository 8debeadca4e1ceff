//! Project configuration.
//!
//! A project is configured by an optional `dompile.toml` next to the
//! content directory:
//!
//! ```toml
//! source = "src"                 # content root; virtual includes resolve here
//! includes = "includes"          # shared fragments, relative to source
//! head = "includes/head.html"    # head snippet (default: <includes>/head.html if present)
//! path-confinement = "confined"  # or "unconfined"
//! max-include-depth = 10
//! pretty-urls = false            # markdown links to foo.md become foo/ instead of foo.html
//! markdown = "auto"              # or "minimal" to force the plain-text processor
//! ```
//!
//! [`ProjectConfig`] is the on-disk form. [`ProjectConfig::resolve`] turns it
//! into a [`RenderConfig`] with absolute paths, which is what the pipeline
//! receives. The core never reads configuration from the environment.

mod parser;

pub use parser::parse_config;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path_validation::normalize_path;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "dompile.toml";

/// Default bound on nested include depth, independent of cycle detection
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// Where include and layout paths may point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathConfinement {
    /// Only the source root and below
    #[default]
    Confined,
    /// Any absolute location
    Unconfined,
}

/// Which markdown processor the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownMode {
    /// The full processor when compiled in, the minimal one otherwise
    #[default]
    Auto,
    /// Always the minimal plain-text processor
    Minimal,
}

/// `dompile.toml` as written on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    pub source: String,
    pub includes: String,
    pub head: Option<String>,
    pub path_confinement: PathConfinement,
    pub max_include_depth: usize,
    pub pretty_urls: bool,
    pub markdown: MarkdownMode,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source: "src".to_string(),
            includes: "includes".to_string(),
            head: None,
            path_confinement: PathConfinement::default(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            pretty_urls: false,
            markdown: MarkdownMode::default(),
        }
    }
}

impl ProjectConfig {
    /// Load `dompile.toml` from `project_dir`, falling back to defaults when
    /// the file does not exist.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, project_dir.display());
            return Ok(Self::default());
        }
        tracing::debug!("Loading configuration from {}", path.display());
        parse_config(&path)
    }

    /// Resolve relative paths against `project_dir`.
    pub fn resolve(&self, project_dir: &Path) -> RenderConfig {
        let source_root = normalize_path(&project_dir.join(expand_home(&self.source)));
        let head_snippet_path = self.head.as_deref().map(|head| {
            let head = expand_home(head);
            if head.is_absolute() {
                normalize_path(&head)
            } else {
                normalize_path(&source_root.join(head))
            }
        });

        RenderConfig {
            source_root,
            includes_dir: PathBuf::from(&self.includes),
            head_snippet_path,
            path_confinement: self.path_confinement,
            max_include_depth: self.max_include_depth,
            pretty_urls: self.pretty_urls,
            markdown: self.markdown,
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Configuration handed to the render pipeline.
///
/// All paths are absolute. Build one with [`RenderConfig::new`] and the
/// `with_*` methods, or from a [`ProjectConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Logical content root; virtual includes resolve against it
    pub source_root: PathBuf,
    /// Shared fragments directory, relative to `source_root`
    pub includes_dir: PathBuf,
    /// Explicit head snippet; `None` means `<includes>/head.html` when present
    pub head_snippet_path: Option<PathBuf>,
    pub path_confinement: PathConfinement,
    pub max_include_depth: usize,
    pub pretty_urls: bool,
    pub markdown: MarkdownMode,
}

impl RenderConfig {
    /// Defaults for everything except the source root.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        let defaults = ProjectConfig::default();
        Self {
            source_root: normalize_path(&source_root.into()),
            includes_dir: PathBuf::from(defaults.includes),
            head_snippet_path: None,
            path_confinement: defaults.path_confinement,
            max_include_depth: defaults.max_include_depth,
            pretty_urls: defaults.pretty_urls,
            markdown: defaults.markdown,
        }
    }

    #[must_use]
    pub fn with_includes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.includes_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_head_snippet(mut self, path: impl Into<PathBuf>) -> Self {
        self.head_snippet_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_path_confinement(mut self, confinement: PathConfinement) -> Self {
        self.path_confinement = confinement;
        self
    }

    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    #[must_use]
    pub fn with_pretty_urls(mut self, pretty: bool) -> Self {
        self.pretty_urls = pretty;
        self
    }

    #[must_use]
    pub fn with_markdown(mut self, mode: MarkdownMode) -> Self {
        self.markdown = mode;
        self
    }

    /// Absolute path of the includes directory
    pub fn includes_root(&self) -> PathBuf {
        self.source_root.join(&self.includes_dir)
    }

    /// Head snippet used when none is configured
    pub fn default_head_snippet(&self) -> PathBuf {
        self.includes_root().join("head.html")
    }
}
