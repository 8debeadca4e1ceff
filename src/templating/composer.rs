//! Layout chain resolution and slot composition.
//!
//! Composition runs innermost outward. The document's fills go into its
//! layout's placeholders; whatever that layout produces (its own fills and
//! default content) plus the fills nobody consumed yet move up to the next
//! layout, and so on up to the root layout. When a forwarded fill and a
//! layout's own fill share a name, the forwarded one wins.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::{Diagnostic, DiagnosticKind, SourceDocument, SourceRange};
use crate::resolver::{DependencyKind, DependencyTracker};
use crate::templating::directive::IncludeKind;
use crate::templating::expander::IncludeExpander;
use crate::templating::template::{LayoutReference, SlotInfo, TemplateInfo, parse_placeholders};
use crate::utils::inline_marker;

/// A layout loaded and include-expanded for composition.
#[derive(Debug, Clone)]
pub struct LoadedLayout {
    pub document: SourceDocument,
    /// Include-expanded text
    pub body: String,
    pub info: TemplateInfo,
}

/// Layouts a document renders into, nearest first.
#[derive(Debug, Clone, Default)]
pub struct LayoutChain {
    pub layouts: Vec<LoadedLayout>,
}

impl LayoutChain {
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// A fill on its way up the chain, remembering who supplied it.
#[derive(Debug, Clone)]
struct PendingFill {
    name: String,
    content: String,
    file: PathBuf,
    range: SourceRange,
}

pub struct TemplateComposer<'e, 'a> {
    expander: &'e IncludeExpander<'a>,
}

impl<'e, 'a> TemplateComposer<'e, 'a> {
    pub fn new(expander: &'e IncludeExpander<'a>) -> Self {
        Self {
            expander,
        }
    }

    /// Compose `body` (the document's include-expanded text) into its layout
    /// chain.
    ///
    /// An `extends` tag takes precedence over `front_matter_layout`. A
    /// document with neither comes back unchanged.
    pub fn compose_document(
        &self,
        document: &SourceDocument,
        body: &str,
        front_matter_layout: Option<&str>,
        tracker: &mut DependencyTracker,
    ) -> Composition {
        let info = TemplateInfo::parse(body);
        let original = TemplateInfo::parse(document.text());

        let reference = match (&info.extends, front_matter_layout) {
            (Some(extends), _) => LayoutReference {
                range: original.extends.as_ref().map_or(extends.range, |e| e.range),
                ..extends.clone()
            },
            (None, Some(layout)) => LayoutReference::front_matter(layout),
            (None, None) => {
                return Composition {
                    html: body.to_string(),
                    diagnostics: Vec::new(),
                };
            }
        };

        let mut diagnostics = Vec::new();
        let html = match self.resolve_chain(document, &reference, tracker, &mut diagnostics) {
            Ok(chain) => {
                tracing::debug!(
                    "Composing {} into {} layout(s)",
                    document.path().display(),
                    chain.len()
                );
                self.compose(document, &info, &original, &chain, &mut diagnostics)
            }
            Err(failure) => {
                tracing::warn!("{}: {}", failure.file.display(), failure.message);
                let html = format!("{}\n{}", inline_marker(&failure.message), info.flattened());
                diagnostics.push(failure);
                html
            }
        };

        Composition {
            html,
            diagnostics,
        }
    }

    /// Follow `extends` from `document` until a layout without one.
    ///
    /// Layout include diagnostics go to `diagnostics`; a cycle, a missing
    /// layout or an unreadable layout ends the walk with `Err`.
    pub fn resolve_chain(
        &self,
        document: &SourceDocument,
        reference: &LayoutReference,
        tracker: &mut DependencyTracker,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<LayoutChain, Diagnostic> {
        let store = self.expander.store();
        let source_root = &self.expander.config().source_root;

        let mut chain = LayoutChain::default();
        let mut seen = vec![document.path().to_path_buf()];
        let mut from = document.path().to_path_buf();
        let mut reference = reference.clone();

        loop {
            let (path, escapes) = self.locate_layout(&reference, &from);

            if let Some(start) = seen.iter().position(|p| *p == path) {
                let mut cycle: Vec<String> = seen[start..].iter().map(|p| self.display(p)).collect();
                cycle.push(self.display(&path));
                return Err(Diagnostic::new(
                    DiagnosticKind::LayoutCycle,
                    &from,
                    reference.range,
                    format!("Layout cycle detected: {}", cycle.join(" -> ")),
                ));
            }

            if escapes || !store.is_file(&path) {
                return Err(Diagnostic::new(
                    DiagnosticKind::LayoutNotFound,
                    &from,
                    reference.range,
                    format!("Layout not found: {}", reference.path),
                ));
            }

            tracker.record_as(&from, &path, DependencyKind::Layout);

            let layout = SourceDocument::load(store, &path, source_root).map_err(|e| {
                Diagnostic::new(
                    DiagnosticKind::BackingStoreFailure,
                    &from,
                    reference.range,
                    format!("Failed to read layout {}: {}", reference.path, e),
                )
            })?;

            let expansion = self.expander.expand_document(&layout, tracker);
            diagnostics.extend(expansion.diagnostics);
            let info = TemplateInfo::parse(&expansion.content);
            let next = info.extends.clone().map(|next| LayoutReference {
                range: TemplateInfo::parse(layout.text()).extends.map_or(next.range, |e| e.range),
                ..next
            });

            tracing::debug!("Layout {} -> {}", from.display(), path.display());
            seen.push(path.clone());
            chain.layouts.push(LoadedLayout {
                document: layout,
                body: expansion.content,
                info,
            });

            match next {
                Some(next) => {
                    from = path;
                    reference = next;
                }
                None => break,
            }
        }

        Ok(chain)
    }

    /// Compose a document's fills through an already resolved chain.
    ///
    /// `info` describes the expanded body and supplies content; `original`
    /// describes the unexpanded text and supplies ranges.
    pub fn compose(
        &self,
        document: &SourceDocument,
        info: &TemplateInfo,
        original: &TemplateInfo,
        chain: &LayoutChain,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let mut pending = pending_fills(document.path(), info, original, diagnostics);
        let mut html = String::new();

        for (i, layout) in chain.layouts.iter().enumerate() {
            let filled = fill_layout(layout, &mut pending, diagnostics);

            if i + 1 == chain.len() {
                html = filled;
                break;
            }

            let layout_info = TemplateInfo::parse(&filled);
            let layout_original = TemplateInfo::parse(layout.document.text());
            let mut next =
                pending_fills(layout.document.path(), &layout_info, &layout_original, diagnostics);
            for fill in pending.drain(..) {
                match next.iter_mut().find(|existing| existing.name == fill.name) {
                    Some(existing) => *existing = fill,
                    None => next.push(fill),
                }
            }
            pending = next;
        }

        for orphan in pending {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::OrphanSlotContent,
                &orphan.file,
                orphan.range,
                format!("Slot '{}' is not declared by any layout in the chain", orphan.name),
            ));
            if !orphan.content.is_empty() {
                html.push('\n');
                html.push_str(&orphan.content);
            }
        }

        html
    }

    fn locate_layout(&self, reference: &LayoutReference, from: &Path) -> (PathBuf, bool) {
        let config = self.expander.config();
        let resolver = self.expander.resolver();
        let raw = reference.path.as_str();

        if reference.from_front_matter && is_bare_name(raw) {
            let mut name = config.includes_dir.join(raw);
            if name.extension().is_none() {
                name.set_extension("html");
            }
            return resolver.locate(
                IncludeKind::Virtual,
                &name.to_string_lossy(),
                from,
                &config.source_root,
            );
        }

        let kind = if raw.starts_with('/') {
            IncludeKind::Virtual
        } else {
            IncludeKind::File
        };
        resolver.locate(kind, raw, from, &config.source_root)
    }

    fn display(&self, path: &Path) -> String {
        let root = &self.expander.config().source_root;
        path.strip_prefix(root).unwrap_or(path).display().to_string()
    }
}

fn is_bare_name(raw: &str) -> bool {
    !(raw.starts_with('/') || raw.starts_with("./") || raw.starts_with("../"))
}

/// Fills supplied by one file, with duplicate-name warnings.
fn pending_fills(
    file: &Path,
    info: &TemplateInfo,
    original: &TemplateInfo,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PendingFill> {
    for duplicate in &info.duplicates {
        let range = original
            .duplicates
            .iter()
            .find(|d| d.name == duplicate.name)
            .map_or(SourceRange::file_start(), |d| d.range);
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::DuplicateSlot,
            file,
            range,
            format!("Slot '{}' is filled more than once; the last fill is used", duplicate.name),
        ));
    }

    info.slots
        .iter()
        .map(|slot: &SlotInfo| PendingFill {
            name: slot.name.clone(),
            content: slot.content.clone(),
            file: file.to_path_buf(),
            range: original.slot(&slot.name).map_or(SourceRange::file_start(), |s| s.range),
        })
        .collect()
}

/// Substitute `pending` fills into a layout's placeholders and drop the
/// consumed fills from `pending`.
fn fill_layout(
    layout: &LoadedLayout,
    pending: &mut Vec<PendingFill>,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let body = layout.body.as_str();
    let original = parse_placeholders(layout.document.text());
    let mut out = String::with_capacity(body.len());
    let mut consumed = HashSet::new();
    let mut reported = HashSet::new();
    let mut last = 0;

    for placeholder in parse_placeholders(body) {
        out.push_str(&body[last..placeholder.span.start]);
        last = placeholder.span.end;

        if let Some(fill) = pending.iter().find(|fill| fill.name == placeholder.name) {
            out.push_str(&fill.content);
            consumed.insert(placeholder.name.clone());
            continue;
        }

        if placeholder.required && reported.insert(placeholder.name.clone()) {
            let range = original
                .iter()
                .find(|p| p.name == placeholder.name)
                .map_or(SourceRange::file_start(), |p| p.range);
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingRequiredSlot,
                layout.document.path(),
                range,
                format!("Required slot '{}' was not filled", placeholder.name),
            ));
        }
        out.push_str(&placeholder.fallback);
    }
    out.push_str(&body[last..]);

    pending.retain(|fill| !consumed.contains(&fill.name));
    out
}
