//! The render pipeline.
//!
//! ```text
//! Start -> Markdown? -> Includes -> Templates -> Head -> Done
//!   \__________\___________\___________\__________\--> Error
//! ```
//!
//! Only two things stop a render: a source root that does not exist and a
//! root document that cannot be read. Both produce an error page and a
//! single `BackingStoreFailure` diagnostic. Everything else is reported as
//! a diagnostic and rendering continues with what is left.
//!
//! A [`RenderPipeline`] holds no per-render state and can be shared across
//! threads behind an [`Arc`]; each call to [`RenderPipeline::render`] owns
//! its own dependency tracker and diagnostics.

pub mod assets;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RenderConfig;
use crate::core::{Diagnostic, DiagnosticKind, DompileError, Severity, SourceDocument, SourceRange};
use crate::markdown::{MarkdownOptions, MarkdownProcessor, processor_for};
use crate::resolver::{DependencyKind, DependencyTracker};
use crate::storage::BackingStore;
use crate::templating::{IncludeExpander, TemplateComposer, head, parse_directives};
use crate::utils::escape_html;

pub use assets::collect_assets;

/// Stages of a render, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Start,
    Markdown,
    Includes,
    Templates,
    Head,
    Done,
    Error,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStage::Start => "start",
            RenderStage::Markdown => "markdown",
            RenderStage::Includes => "includes",
            RenderStage::Templates => "templates",
            RenderStage::Head => "head",
            RenderStage::Done => "done",
            RenderStage::Error => "error",
        };
        f.write_str(name)
    }
}

/// Everything a render produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderResult {
    pub html: String,
    /// Files whose change should trigger a re-render, first-encountered
    /// order. Never contains the rendered document itself.
    pub dependencies: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    pub assets: Vec<PathBuf>,
    /// Page title from markdown front matter or its first heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RenderResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }
}

pub struct RenderPipeline {
    config: RenderConfig,
    store: Arc<dyn BackingStore>,
    markdown: Arc<dyn MarkdownProcessor>,
}

impl fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("config", &self.config)
            .field("markdown", &self.markdown.name())
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    /// Build a pipeline; the markdown processor is chosen here from
    /// `config.markdown` and the compiled-in features.
    pub fn new(config: RenderConfig, store: Arc<dyn BackingStore>) -> Self {
        let markdown = processor_for(config.markdown);
        tracing::debug!(
            "Render pipeline for {} using {} markdown",
            config.source_root.display(),
            markdown.name()
        );
        Self {
            config,
            store,
            markdown,
        }
    }

    /// Replace the markdown processor.
    #[must_use]
    pub fn with_markdown_processor(mut self, processor: Arc<dyn MarkdownProcessor>) -> Self {
        self.markdown = processor;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn BackingStore {
        self.store.as_ref()
    }

    /// Read the document at `path` and render it.
    pub fn render_path(&self, path: &Path) -> RenderResult {
        match SourceDocument::load(self.store.as_ref(), path, &self.config.source_root) {
            Ok(document) => self.render(&document),
            Err(e) => self.fail(path, &e),
        }
    }

    pub fn render(&self, document: &SourceDocument) -> RenderResult {
        self.render_traced(document).0
    }

    /// Like [`render_path`](Self::render_path), also returning the full
    /// dependency graph of the render.
    pub fn trace_path(&self, path: &Path) -> (RenderResult, DependencyTracker) {
        match SourceDocument::load(self.store.as_ref(), path, &self.config.source_root) {
            Ok(document) => self.render_traced(&document),
            Err(e) => (self.fail(path, &e), DependencyTracker::new()),
        }
    }

    /// Render and keep the dependency graph, for callers that need more
    /// than the flat dependency list.
    pub fn render_traced(&self, document: &SourceDocument) -> (RenderResult, DependencyTracker) {
        let path = document.path();
        let source_root = &self.config.source_root;
        let mut stage = RenderStage::Start;
        tracing::debug!("Rendering {} [{}]", path.display(), stage);

        if !self.store.exists(source_root) {
            let error = DompileError::SourceRootMissing {
                path: source_root.clone(),
            };
            return (self.fail(path, &error), DependencyTracker::new());
        }

        let store = self.store.as_ref();
        let expander = IncludeExpander::new(store, &self.config);
        let mut tracker = DependencyTracker::new();
        let mut diagnostics = Vec::new();
        let mut layout = None;
        let mut title = None;

        let mut directive_ranges = Vec::new();
        let working = if self.markdown.is_markdown_file(path) {
            stage = RenderStage::Markdown;
            tracing::debug!("Rendering {} [{}]", path.display(), stage);
            let output = self.markdown.transform(
                document.text(),
                path,
                source_root,
                &MarkdownOptions {
                    pretty_urls: self.config.pretty_urls,
                },
            );
            layout = output.layout;
            title = output.title;
            directive_ranges = source_ranges(document.text(), &output.html);
            SourceDocument::new(path, output.html, source_root)
        } else {
            document.clone()
        };

        stage = RenderStage::Includes;
        tracing::debug!("Rendering {} [{}]", path.display(), stage);
        let mut expansion = expander.expand_document(&working, &mut tracker);
        for diagnostic in expansion.diagnostics.iter_mut().filter(|d| d.file == path) {
            if let Some((_, source)) =
                directive_ranges.iter().find(|(generated, _)| *generated == diagnostic.range)
            {
                diagnostic.range = *source;
            }
        }
        diagnostics.extend(expansion.diagnostics);

        stage = RenderStage::Templates;
        tracing::debug!("Rendering {} [{}]", path.display(), stage);
        // Template ranges come from the document's own source text
        let composition = TemplateComposer::new(&expander).compose_document(
            document,
            &expansion.content,
            layout.as_deref(),
            &mut tracker,
        );
        diagnostics.extend(composition.diagnostics);
        let mut html = composition.html;

        stage = RenderStage::Head;
        tracing::debug!("Rendering {} [{}]", path.display(), stage);
        if let Some(snippet) = self.head_snippet(&expander, path, &mut tracker, &mut diagnostics) {
            let injection = head::inject(&html, &snippet, path);
            diagnostics.extend(injection.diagnostics);
            html = injection.html;
        }

        let assets = collect_assets(&html, path, source_root);
        let dependencies = tracker.get_dependencies(path);

        stage = RenderStage::Done;
        tracing::debug!(
            "Rendered {} [{}]: {} dependencies, {} diagnostics",
            path.display(),
            stage,
            dependencies.len(),
            diagnostics.len()
        );

        let result = RenderResult {
            html,
            dependencies,
            diagnostics,
            assets,
            title,
        };
        (result, tracker)
    }

    /// The include-expanded head snippet, if there is one to inject.
    fn head_snippet(
        &self,
        expander: &IncludeExpander<'_>,
        document: &Path,
        tracker: &mut DependencyTracker,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<String> {
        let store = self.store.as_ref();
        let snippet_path = match &self.config.head_snippet_path {
            Some(configured) => {
                let configured = if configured.is_absolute() {
                    configured.clone()
                } else {
                    self.config.source_root.join(configured)
                };
                if !store.is_file(&configured) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::IncludeNotFound,
                            document,
                            SourceRange::file_start(),
                            format!("Head snippet not found: {}", configured.display()),
                        )
                        .with_severity(Severity::Warning),
                    );
                    return None;
                }
                configured
            }
            None => {
                let default = self.config.default_head_snippet();
                if !store.is_file(&default) {
                    return None;
                }
                default
            }
        };

        tracker.record_as(document, &snippet_path, DependencyKind::Head);
        let snippet = match SourceDocument::load(store, &snippet_path, &self.config.source_root) {
            Ok(snippet) => snippet,
            Err(e) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::BackingStoreFailure,
                    document,
                    SourceRange::file_start(),
                    format!("Failed to read head snippet: {e}"),
                ));
                return None;
            }
        };

        let expansion = expander.expand_document(&snippet, tracker);
        diagnostics.extend(expansion.diagnostics);
        Some(expansion.content)
    }

    fn fail(&self, path: &Path, error: &DompileError) -> RenderResult {
        let message = error.to_string();
        tracing::error!("Rendering {} [{}]: {}", path.display(), RenderStage::Error, message);
        RenderResult {
            html: error_page(&message),
            diagnostics: vec![Diagnostic::new(
                DiagnosticKind::BackingStoreFailure,
                path,
                SourceRange::file_start(),
                message,
            )],
            ..RenderResult::default()
        }
    }
}

/// Pairs each directive in markdown-generated HTML with the same directive
/// in the markdown source, matching in order by kind and path. Directives
/// the converter dropped or escaped are skipped.
fn source_ranges(source: &str, generated: &str) -> Vec<(SourceRange, SourceRange)> {
    let source_directives = parse_directives(source);
    let mut remaining = source_directives.iter();
    parse_directives(generated)
        .into_iter()
        .filter_map(|directive| {
            remaining
                .find(|s| s.kind == directive.kind && s.raw_path == directive.raw_path)
                .map(|s| (directive.range, s.range))
        })
        .collect()
}

/// Standalone page shown in place of a document that could not be rendered.
pub fn error_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>dompile Preview Error</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            max-width: 800px;
            margin: 2rem auto;
            padding: 2rem;
            background: #f5f5f5;
            color: #333;
        }}
        .error {{
            background: #fee;
            border: 1px solid #fcc;
            border-radius: 4px;
            padding: 1rem;
        }}
        .error h2 {{ color: #c33; margin-top: 0; }}
        pre {{ background: #f8f8f8; padding: 1rem; overflow-x: auto; }}
    </style>
</head>
<body>
    <h1>dompile Preview Error</h1>
    <div class="error">
        <h2>Rendering Failed</h2>
        <pre>{}</pre>
    </div>
</body>
</html>
"#,
        escape_html(message)
    )
}
