//! dompile - include, layout and slot preprocessing for static sites
//!
//! dompile renders HTML and markdown documents by expanding server-side
//! include directives, composing pages with layouts and named slots, and
//! injecting a shared head snippet. Problems never abort a render: every
//! stage records a positioned [`core::Diagnostic`] and leaves an inline
//! marker in the output, so a preview always shows something.
//!
//! # Render pipeline
//!
//! ```text
//! source ──► markdown ──► includes ──► layouts/slots ──► head ──► RenderResult
//!            (.md only)   (recursive,   (extends chain,    (snippet
//!                          cycle-safe)   slot filling)      injection)
//! ```
//!
//! Every file read along the way is recorded in a
//! [`resolver::DependencyTracker`], so callers can tell which pages to
//! re-render when a partial changes.
//!
//! # Directives
//!
//! ```html
//! <!--#include virtual="/includes/nav.html" -->   <!-- from the source root -->
//! <!--#include file="sidebar.html" -->            <!-- from the document's directory -->
//!
//! <template extends="/layouts/base.html"></template>
//! <template slot="title">About</template>
//! <p>Default slot content</p>
//! ```
//!
//! Layouts declare where content goes with `<slot>` elements:
//!
//! ```html
//! <title><slot name="title">Untitled</slot></title>
//! <main><slot required></slot></main>
//! ```
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//! use dompile::config::RenderConfig;
//! use dompile::core::SourceDocument;
//! use dompile::pipeline::RenderPipeline;
//! use dompile::storage::MemoryStore;
//!
//! let store = MemoryStore::with_files([
//!     ("/site/src/includes/nav.html", "<nav>Home</nav>"),
//!     ("/site/src/index.html", "<!--#include virtual=\"/includes/nav.html\" --><p>Hi</p>"),
//! ]);
//! let pipeline = RenderPipeline::new(RenderConfig::new("/site/src"), Arc::new(store));
//!
//! let result = pipeline.render_path(Path::new("/site/src/index.html"));
//! assert_eq!(result.html, "<nav>Home</nav><p>Hi</p>");
//! assert!(result.diagnostics.is_empty());
//! ```
//!
//! # Modules
//!
//! - [`pipeline`] - [`pipeline::RenderPipeline`], the entry point
//! - [`templating`] - include expansion, layout composition, head injection
//! - [`resolver`] - path resolution and dependency tracking
//! - [`markdown`] - markdown to HTML with front matter
//! - [`storage`] - the [`storage::BackingStore`] abstraction over files
//! - [`config`] - `dompile.toml` loading
//! - [`core`] - documents, diagnostics and errors
//! - [`cli`] - the `dompile` command

// Core functionality modules
pub mod cli;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod resolver;

// Rendering stages
pub mod markdown;
pub mod templating;

// Supporting modules
pub mod storage;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
