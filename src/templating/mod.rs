//! Include expansion, layout composition and head injection.
//!
//! These are the text-level stages of a render, in the order the pipeline
//! runs them:
//!
//! 1. [`expander`] replaces `<!--#include ...-->` directives
//! 2. [`composer`] wraps the result in its layout chain and fills slots
//! 3. [`head`] merges the shared head snippet
//!
//! The markup each stage understands is parsed by [`directive`] and
//! [`template`]. Every stage reports problems as [`Diagnostic`]s and keeps
//! going; none of them returns an error.
//!
//! # Example
//!
//! ```rust
//! use dompile::config::RenderConfig;
//! use dompile::core::SourceDocument;
//! use dompile::resolver::DependencyTracker;
//! use dompile::storage::MemoryStore;
//! use dompile::templating::IncludeExpander;
//! use std::path::Path;
//!
//! let store = MemoryStore::with_files([("/site/src/nav.html", "<nav/>")]);
//! let config = RenderConfig::new("/site/src");
//! let document = SourceDocument::new(
//!     "/site/src/index.html",
//!     "<!--#include virtual=\"nav.html\"--><main/>",
//!     Path::new("/site/src"),
//! );
//!
//! let mut tracker = DependencyTracker::new();
//! let expansion = IncludeExpander::new(&store, &config).expand_document(&document, &mut tracker);
//! assert_eq!(expansion.content, "<nav/><main/>");
//! ```
//!
//! [`Diagnostic`]: crate::core::Diagnostic

pub mod composer;
pub mod directive;
pub mod expander;
pub mod head;
pub mod template;

pub use composer::{Composition, LayoutChain, LoadedLayout, TemplateComposer};
pub use directive::{IncludeDirective, IncludeKind, parse_directives};
pub use expander::{Expansion, IncludeExpander};
pub use head::{HeadInjection, HeadPlacement, inject};
pub use template::{
    DEFAULT_SLOT, LayoutReference, SlotInfo, SlotPlaceholder, TemplateInfo, parse_placeholders,
};
