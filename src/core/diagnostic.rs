//! Structured diagnostics produced during a render pass.
//!
//! Diagnostics are data, not errors: a missing include or a layout cycle is
//! recorded here and the render carries on with the remaining branches.
//! Each diagnostic names the file it belongs to and a zero-based
//! line/character range so editors can attribute it to a specific line.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Zero-based position; `character` counts chars on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub const fn new(line: usize, character: usize) -> Self {
        Self {
            line,
            character,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceRange {
    pub start: Position,
    pub end: Position,
}

impl SourceRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
        }
    }

    /// The empty range at the start of a file
    pub const fn file_start() -> Self {
        Self::new(Position::new(0, 0), Position::new(0, 0))
    }
}

/// Maps byte offsets of one text to line/character positions.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self {
            text,
            line_starts,
        }
    }

    /// Position of a byte offset. Offsets past the end clamp to the end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character = self.text.get(line_start..offset).map_or(0, |s| s.chars().count());
        Position::new(line, character)
    }

    pub fn range(&self, span: std::ops::Range<usize>) -> SourceRange {
        SourceRange::new(self.position(span.start), self.position(span.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Which part of the template language a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Include,
    Template,
    Slot,
    Layout,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticCategory::Include => "include",
            DiagnosticCategory::Template => "template",
            DiagnosticCategory::Slot => "slot",
            DiagnosticCategory::Layout => "layout",
        };
        f.write_str(name)
    }
}

/// Diagnostic taxonomy.
///
/// Severity and category follow from the kind, see [`DiagnosticKind::severity`]
/// and [`DiagnosticKind::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    IncludeNotFound,
    IncludeCycle,
    MaxDepthExceeded,
    LayoutCycle,
    LayoutNotFound,
    MissingRequiredSlot,
    OrphanSlotContent,
    DuplicateSlot,
    HeadTargetMissing,
    BackingStoreFailure,
}

impl DiagnosticKind {
    pub const fn severity(self) -> Severity {
        match self {
            DiagnosticKind::MissingRequiredSlot
            | DiagnosticKind::OrphanSlotContent
            | DiagnosticKind::DuplicateSlot
            | DiagnosticKind::HeadTargetMissing => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub const fn category(self) -> DiagnosticCategory {
        match self {
            DiagnosticKind::IncludeNotFound
            | DiagnosticKind::IncludeCycle
            | DiagnosticKind::MaxDepthExceeded
            | DiagnosticKind::BackingStoreFailure => DiagnosticCategory::Include,
            DiagnosticKind::LayoutCycle | DiagnosticKind::LayoutNotFound => {
                DiagnosticCategory::Layout
            }
            DiagnosticKind::MissingRequiredSlot
            | DiagnosticKind::OrphanSlotContent
            | DiagnosticKind::DuplicateSlot => DiagnosticCategory::Slot,
            DiagnosticKind::HeadTargetMissing => DiagnosticCategory::Template,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// File the range refers to
    pub file: PathBuf,
    pub range: SourceRange,
    pub message: String,
    pub severity: Severity,
    pub category: DiagnosticCategory,
    pub kind: DiagnosticKind,
    /// "Did you mean" candidates, may be empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        file: impl Into<PathBuf>,
        range: SourceRange,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            range,
            message: message.into(),
            severity: kind.severity(),
            category: kind.category(),
            kind,
            suggestions: Vec::new(),
        }
    }

    /// Override the default severity of the kind.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}]: {}",
            self.file.display(),
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity,
            self.category,
            self.message
        )
    }
}
