//! Lexical path normalization and confinement checks.
//!
//! Include targets are resolved without touching the backing store, so
//! normalization here is purely lexical: no symlink resolution and no
//! `canonicalize()`. The backing store may be in memory.

use std::path::{Component, Path, PathBuf};

/// Convert `\` separators to `/`.
///
/// Directive paths are written by hand and occasionally use Windows
/// separators; they are treated as `/` on every platform.
pub fn normalize_separators(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Lexically normalize `path`: drop `.` components and fold `..` into the
/// preceding component.
///
/// `..` that would climb above the root of an absolute path is discarded.
/// On a relative path, leading `..` components are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
        }
    }

    normalized
}

/// Whether the normalized `path` stays inside the normalized `root`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    normalize_path(path).starts_with(normalize_path(root))
}
