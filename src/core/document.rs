use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::DompileError;
use crate::storage::BackingStore;
use crate::utils::normalize_path;

/// Immutable snapshot of one document for one render pass.
///
/// Cloning is cheap; the text is shared. Re-rendering after an edit builds
/// a new snapshot rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
    logical_path: PathBuf,
    text: Arc<str>,
}

impl SourceDocument {
    /// Snapshot `text` for the document at absolute `path`. The path is
    /// lexically normalized so it compares equal to resolved include targets.
    ///
    /// The logical path is `path` relative to `source_root` when the
    /// document lives under it, otherwise `path` itself.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>, source_root: &Path) -> Self {
        let path = normalize_path(&path.into());
        let logical_path = path.strip_prefix(source_root).map_or_else(|_| path.clone(), Path::to_path_buf);
        Self {
            path,
            logical_path,
            text: text.into(),
        }
    }

    /// Load a snapshot through the backing store.
    pub fn load(
        store: &dyn BackingStore,
        path: &Path,
        source_root: &Path,
    ) -> Result<Self, DompileError> {
        let text = store.read_text(path)?;
        Ok(Self::new(path, text, source_root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn logical_path(&self) -> &Path {
        &self.logical_path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Directory containing the document
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }
}
