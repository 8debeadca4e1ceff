//! Path and HTML helpers.
//!
//! - [`path_validation`] - lexical normalization and containment checks
//! - [`html`] - escaping and inline error markers

pub mod html;
pub mod path_validation;

pub use html::{escape_html, inline_marker};
pub use path_validation::{is_within, normalize_path, normalize_separators};
