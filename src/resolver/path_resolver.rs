//! Include target resolution.
//!
//! - `virtual` paths are anchored at the source root, whatever the depth
//!   of the including file; a leading `/` is ignored
//! - `file` paths are anchored at the including file's directory
//!
//! Resolution never fails. A target that is missing, is a directory, or
//! escapes the source root under [`PathConfinement::Confined`] comes back
//! with `exists == false` so the caller can report it and move on.

use std::path::{Path, PathBuf};
use strsim::levenshtein;

use crate::config::PathConfinement;
use crate::storage::BackingStore;
use crate::templating::directive::{IncludeDirective, IncludeKind};
use crate::utils::path_validation::{is_within, normalize_path, normalize_separators};

/// Maximum edit distance, as a percentage of the target name length, for
/// "did you mean" suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Suggestions returned per missing include
const MAX_SUGGESTIONS: usize = 3;

/// A directive together with where it points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    pub directive: IncludeDirective,
    /// Absolute, lexically normalized target
    pub resolved_path: PathBuf,
    /// Target is a regular file inside the allowed area
    pub exists: bool,
    /// Target was rejected by the confinement policy
    pub escapes_root: bool,
}

/// Resolves directive paths against a backing store.
#[derive(Clone, Copy)]
pub struct PathResolver<'a> {
    store: &'a dyn BackingStore,
    confinement: PathConfinement,
}

impl<'a> PathResolver<'a> {
    pub fn new(store: &'a dyn BackingStore, confinement: PathConfinement) -> Self {
        Self {
            store,
            confinement,
        }
    }

    pub fn resolve(
        &self,
        directive: &IncludeDirective,
        including_file: &Path,
        source_root: &Path,
    ) -> ResolvedInclude {
        let (resolved_path, escapes_root) =
            self.locate(directive.kind, &directive.raw_path, including_file, source_root);
        // Directories count as missing
        let exists = !escapes_root && self.store.is_file(&resolved_path);

        tracing::trace!(
            "Resolved {} include '{}' from {} to {} (exists: {})",
            directive.kind,
            directive.raw_path,
            including_file.display(),
            resolved_path.display(),
            exists
        );

        ResolvedInclude {
            directive: directive.clone(),
            resolved_path,
            exists,
            escapes_root,
        }
    }

    /// Compute the normalized target of `raw_path` and whether the
    /// confinement policy rejects it. Does not consult the store.
    pub fn locate(
        &self,
        kind: IncludeKind,
        raw_path: &str,
        including_file: &Path,
        source_root: &Path,
    ) -> (PathBuf, bool) {
        let raw = normalize_separators(raw_path);
        let joined = match kind {
            IncludeKind::Virtual => source_root.join(raw.trim_start_matches('/')),
            IncludeKind::File => {
                let relative = Path::new(&raw);
                if relative.is_absolute() {
                    relative.to_path_buf()
                } else {
                    including_file.parent().unwrap_or_else(|| Path::new("/")).join(relative)
                }
            }
        };
        let resolved = normalize_path(&joined);
        let escapes = self.confinement == PathConfinement::Confined
            && !is_within(&resolved, source_root);
        (resolved, escapes)
    }

    /// Close matches for a missing include, phrased the way the directive
    /// would need to be written.
    pub fn suggestions(&self, resolved: &ResolvedInclude) -> Vec<String> {
        let Some(wanted) = resolved.resolved_path.file_name().and_then(|n| n.to_str()) else {
            return Vec::new();
        };
        let Some(dir) = resolved.resolved_path.parent() else {
            return Vec::new();
        };
        let Ok(entries) = self.store.list_dir(dir) else {
            return Vec::new();
        };

        let threshold = (wanted.chars().count() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        let mut candidates: Vec<(usize, String)> = entries
            .iter()
            .filter(|entry| self.store.is_file(entry))
            .filter_map(|entry| entry.file_name()?.to_str().map(str::to_string))
            .map(|name| (levenshtein(wanted, &name), name))
            .filter(|(distance, _)| *distance > 0 && *distance <= threshold)
            .collect();
        candidates.sort();

        let raw = normalize_separators(&resolved.directive.raw_path);
        let prefix = raw.rsplit_once('/').map(|(dir, _)| format!("{dir}/")).unwrap_or_default();
        candidates
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| format!("{prefix}{name}"))
            .collect()
    }
}
