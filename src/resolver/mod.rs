//! Path resolution and dependency tracking.
//!
//! [`PathResolver`] turns a directive path into an absolute, normalized
//! location and decides whether it may be used. [`DependencyTracker`]
//! remembers which file pulled in which, so a host can answer both "what
//! does this page depend on" and "which pages must be re-rendered when this
//! fragment changes".
//!
//! # Resolution rules
//!
//! | Kind      | Anchored at                    | `/foo.html` means              |
//! |-----------|--------------------------------|--------------------------------|
//! | `virtual` | source root                    | `<source root>/foo.html`       |
//! | `file`    | directory of the including file | the absolute path `/foo.html` |
//!
//! Under the default confinement policy any target that normalizes to a
//! location outside the source root is treated as missing.

pub mod dependency_graph;
pub mod path_resolver;

pub use dependency_graph::{DependencyKind, DependencyTracker};
pub use path_resolver::{PathResolver, ResolvedInclude};
