//! Shared `<head>` snippet injection.

use std::path::Path;

use crate::core::{Diagnostic, DiagnosticKind, SourceRange};
use crate::utils::html::find_ignore_ascii_case;

/// Where the snippet ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadPlacement {
    BeforeClosingTag,
    AfterOpeningTag,
    Prepended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadInjection {
    pub html: String,
    pub placement: HeadPlacement,
    pub diagnostics: Vec<Diagnostic>,
}

/// Insert `snippet` into the head of `html`.
///
/// Goes before the first `</head>`; failing that, right after an opening
/// `<head>` tag; failing that, at the very start with a warning against
/// `file`. Existing head content is never inspected for duplicates.
pub fn inject(html: &str, snippet: &str, file: &Path) -> HeadInjection {
    if let Some(close) = find_ignore_ascii_case(html, "</head>") {
        return HeadInjection {
            html: splice(html, close, snippet),
            placement: HeadPlacement::BeforeClosingTag,
            diagnostics: Vec::new(),
        };
    }

    if let Some(after_open) = opening_head_end(html) {
        return HeadInjection {
            html: splice(html, after_open, snippet),
            placement: HeadPlacement::AfterOpeningTag,
            diagnostics: Vec::new(),
        };
    }

    tracing::warn!("{}: no <head> element, prepending head snippet", file.display());
    HeadInjection {
        html: format!("{snippet}{html}"),
        placement: HeadPlacement::Prepended,
        diagnostics: vec![Diagnostic::new(
            DiagnosticKind::HeadTargetMissing,
            file,
            SourceRange::file_start(),
            "Document has no <head> element; head snippet was prepended",
        )],
    }
}

fn splice(html: &str, at: usize, snippet: &str) -> String {
    let mut out = String::with_capacity(html.len() + snippet.len());
    out.push_str(&html[..at]);
    out.push_str(snippet);
    out.push_str(&html[at..]);
    out
}

/// Byte offset just past the first `<head>` or `<head ...>` tag.
fn opening_head_end(html: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = find_ignore_ascii_case(&html[from..], "<head") {
        let start = from + found;
        let rest = &html[start + "<head".len()..];
        match rest.chars().next() {
            Some('>') => return Some(start + "<head>".len()),
            Some(c) if c.is_ascii_whitespace() || c == '/' => {
                return rest.find('>').map(|end| start + "<head".len() + end + 1);
            }
            // <header> and friends
            _ => from = start + "<head".len(),
        }
    }
    None
}
