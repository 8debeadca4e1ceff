//! Include expansion.
//!
//! Each directive is replaced by the fully expanded text of its target.
//! Failures stay local to their directive: the directive is replaced by an
//! inline marker, a diagnostic is recorded, and expansion moves on to the
//! next sibling.
//!
//! Per directive, in order:
//!
//! 1. resolve the target
//! 2. target already on the ancestor chain: `IncludeCycle`
//! 3. target missing or outside the source root: `IncludeNotFound`
//! 4. nesting would exceed the depth bound: `MaxDepthExceeded`
//! 5. record the dependency, read, descend and substitute
//!
//! Diagnostics come out in depth-first preorder, and their ranges always
//! refer to the unexpanded text of the file that holds the directive.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::core::{Diagnostic, DiagnosticKind, SourceDocument};
use crate::resolver::{DependencyTracker, PathResolver, ResolvedInclude};
use crate::storage::BackingStore;
use crate::templating::directive::{IncludeDirective, parse_directives};
use crate::utils::inline_marker;

/// Expanded text plus everything that went wrong producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub content: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// One file being expanded: its text, its directives and how far through
/// them expansion has got.
struct Frame {
    file: PathBuf,
    text: String,
    directives: Vec<IncludeDirective>,
    /// Index of the next directive to expand
    next: usize,
    /// Byte offset up to which `text` has been copied out
    last: usize,
}

impl Frame {
    fn new(file: PathBuf, text: String) -> Self {
        let directives = parse_directives(&text);
        Self {
            file,
            text,
            directives,
            next: 0,
            last: 0,
        }
    }
}

pub struct IncludeExpander<'a> {
    store: &'a dyn BackingStore,
    resolver: PathResolver<'a>,
    config: &'a RenderConfig,
}

impl<'a> IncludeExpander<'a> {
    pub fn new(store: &'a dyn BackingStore, config: &'a RenderConfig) -> Self {
        Self {
            store,
            resolver: PathResolver::new(store, config.path_confinement),
            config,
        }
    }

    pub fn resolver(&self) -> PathResolver<'a> {
        self.resolver
    }

    pub fn store(&self) -> &'a dyn BackingStore {
        self.store
    }

    pub fn config(&self) -> &'a RenderConfig {
        self.config
    }

    /// Expand a top-level document: no ancestors, depth zero.
    pub fn expand_document(
        &self,
        document: &SourceDocument,
        tracker: &mut DependencyTracker,
    ) -> Expansion {
        self.expand(document, &[], 0, tracker)
    }

    /// Expand `document`, which sits `depth` includes below the top and
    /// whose including files are `ancestors` (outermost first).
    ///
    /// Nesting is tracked on an explicit frame stack, so chain length is
    /// bounded only by `max_include_depth` and memory.
    pub fn expand(
        &self,
        document: &SourceDocument,
        ancestors: &[PathBuf],
        depth: usize,
        tracker: &mut DependencyTracker,
    ) -> Expansion {
        let mut chain = ancestors.to_vec();
        chain.push(document.path().to_path_buf());
        let mut on_chain: HashSet<PathBuf> = chain.iter().cloned().collect();

        let mut out = Expansion::default();
        let mut stack = vec![Frame::new(document.path().to_path_buf(), document.text().to_string())];

        while let Some(frame) = stack.last_mut() {
            let Some(directive) = frame.directives.get(frame.next).cloned() else {
                out.content.push_str(&frame.text[frame.last..]);
                stack.pop();
                if let Some(done) = chain.pop() {
                    on_chain.remove(&done);
                }
                continue;
            };
            frame.next += 1;
            out.content.push_str(&frame.text[frame.last..directive.span.start]);
            frame.last = directive.span.end;

            let file = frame.file.clone();
            let level = depth + stack.len() - 1;
            let Some((target, text)) =
                self.expand_directive(&file, &directive, &chain, &on_chain, level, tracker, &mut out)
            else {
                continue;
            };

            tracing::debug!(
                "Expanding {} include '{}' -> {} (depth {})",
                directive.kind,
                directive.raw_path,
                target.display(),
                level + 1
            );
            chain.push(target.clone());
            on_chain.insert(target.clone());
            stack.push(Frame::new(target, text));
        }

        out
    }

    /// Check one directive. Returns the target and its text when expansion
    /// should descend into it; otherwise the failure is already recorded.
    #[allow(clippy::too_many_arguments)]
    fn expand_directive(
        &self,
        file: &Path,
        directive: &IncludeDirective,
        chain: &[PathBuf],
        on_chain: &HashSet<PathBuf>,
        depth: usize,
        tracker: &mut DependencyTracker,
        out: &mut Expansion,
    ) -> Option<(PathBuf, String)> {
        let resolved = self.resolver.resolve(directive, file, &self.config.source_root);
        let target = resolved.resolved_path.clone();

        if on_chain.contains(&target) {
            let start = chain.iter().position(|ancestor| *ancestor == target).unwrap_or(0);
            let mut cycle: Vec<String> =
                chain[start..].iter().map(|path| self.display(path)).collect();
            cycle.push(self.display(&target));
            let message = format!("Circular include detected: {}", cycle.join(" -> "));
            self.fail(file, directive, DiagnosticKind::IncludeCycle, message, Vec::new(), out);
            return None;
        }

        if !resolved.exists {
            let (message, suggestions) = self.not_found(&resolved);
            self.fail(file, directive, DiagnosticKind::IncludeNotFound, message, suggestions, out);
            return None;
        }

        if depth + 1 > self.config.max_include_depth {
            let message = format!(
                "Maximum include depth of {} exceeded at: {}",
                self.config.max_include_depth, directive.raw_path
            );
            self.fail(file, directive, DiagnosticKind::MaxDepthExceeded, message, Vec::new(), out);
            return None;
        }

        tracker.record(file, &target);

        match self.store.read_text(&target) {
            Ok(text) => Some((target, text)),
            Err(e) => {
                let message = format!("Failed to read include {}: {}", directive.raw_path, e);
                self.fail(
                    file,
                    directive,
                    DiagnosticKind::BackingStoreFailure,
                    message,
                    Vec::new(),
                    out,
                );
                None
            }
        }
    }

    fn not_found(&self, resolved: &ResolvedInclude) -> (String, Vec<String>) {
        let raw = &resolved.directive.raw_path;
        if resolved.escapes_root {
            (format!("Include path escapes source root: {raw}"), Vec::new())
        } else {
            (format!("Include file not found: {raw}"), self.resolver.suggestions(resolved))
        }
    }

    fn fail(
        &self,
        file: &Path,
        directive: &IncludeDirective,
        kind: DiagnosticKind,
        message: String,
        suggestions: Vec<String>,
        out: &mut Expansion,
    ) {
        tracing::warn!("{}: {}", file.display(), message);
        out.content.push_str(&inline_marker(&message));
        out.diagnostics.push(
            Diagnostic::new(kind, file, directive.range, message).with_suggestions(suggestions),
        );
    }

    /// Path relative to the source root for messages.
    fn display(&self, path: &Path) -> String {
        path.strip_prefix(&self.config.source_root).unwrap_or(path).display().to_string()
    }
}
