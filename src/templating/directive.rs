//! Include directive parsing.
//!
//! The directive syntax is a fixed wire format:
//!
//! ```html
//! <!--#include virtual="shared/nav.html" -->
//! <!--#include file="./sidebar.html"-->
//! ```
//!
//! The keyword and attribute name match case-insensitively; the path must
//! be double-quoted and non-empty. Comments that only resemble a directive
//! (single quotes, unknown attribute, empty path) are not directives and
//! are left in the output as-is.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use crate::core::{LineIndex, SourceRange};

static INCLUDE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<!--#include\s+(virtual|file)\s*=\s*"([^"]+)"\s*-->"#)
        .expect("include directive pattern is valid")
});

/// How a directive's path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeKind {
    /// Relative to the source root
    Virtual,
    /// Relative to the including file's directory
    File,
}

impl fmt::Display for IncludeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeKind::Virtual => f.write_str("virtual"),
            IncludeKind::File => f.write_str("file"),
        }
    }
}

/// One directive found in a document's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub kind: IncludeKind,
    /// Path exactly as written between the quotes
    pub raw_path: String,
    /// Byte span of the whole directive in the text it was parsed from
    pub span: Range<usize>,
    pub range: SourceRange,
}

impl IncludeDirective {
    /// Build a directive without a location, for resolving ad-hoc paths.
    pub fn detached(kind: IncludeKind, raw_path: impl Into<String>) -> Self {
        Self {
            kind,
            raw_path: raw_path.into(),
            span: 0..0,
            range: SourceRange::file_start(),
        }
    }
}

/// All directives in `text`, in document order.
pub fn parse_directives(text: &str) -> Vec<IncludeDirective> {
    let index = LineIndex::new(text);
    INCLUDE_DIRECTIVE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = if caps[1].eq_ignore_ascii_case("virtual") {
                IncludeKind::Virtual
            } else {
                IncludeKind::File
            };
            Some(IncludeDirective {
                kind,
                raw_path: caps[2].to_string(),
                span: whole.range(),
                range: index.range(whole.range()),
            })
        })
        .collect()
}
