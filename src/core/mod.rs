//! Core types shared by every stage of the renderer
//!
//! - [`error`] - [`DompileError`] for fallible operations and the
//!   user-facing [`ErrorContext`] used by the CLI
//! - [`diagnostic`] - structured, positioned [`Diagnostic`] records that
//!   render stages emit instead of failing
//! - [`document`] - the immutable [`SourceDocument`] snapshot a render works on

pub mod diagnostic;
pub mod document;
pub mod error;

pub use diagnostic::{
    Diagnostic, DiagnosticCategory, DiagnosticKind, LineIndex, Position, Severity, SourceRange,
};
pub use document::SourceDocument;
pub use error::{DompileError, ErrorContext, user_friendly_error};
