//! Backing storage for documents, includes and layouts.
//!
//! The renderer never touches the filesystem directly; every read goes
//! through a [`BackingStore`]. Hosts pick the implementation:
//!
//! - [`FileSystemStore`] reads from disk
//! - [`MemoryStore`] serves files from an in-memory map (tests, or editors
//!   that want unsaved buffers to win over disk contents)
//!
//! Implementations must be safe to re-read at any time; the renderer keeps
//! no cache between passes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::DompileError;

/// Read-only access to source files.
pub trait BackingStore: Send + Sync {
    /// Whether anything (file or directory) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a regular, readable-looking file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read the whole file as UTF-8 text.
    fn read_text(&self, path: &Path) -> Result<String, DompileError>;

    /// Entries directly inside `dir`, sorted. Missing directories yield an error.
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, DompileError>;
}

/// Store backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemStore;

impl BackingStore for FileSystemStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_text(&self, path: &Path) -> Result<String, DompileError> {
        if path.is_dir() {
            return Err(DompileError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        std::fs::read_to_string(path).map_err(|e| DompileError::from_io("read", path, e))
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, DompileError> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| DompileError::from_io("list", dir, e))?;
        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();
        Ok(paths)
    }
}

#[derive(Debug, Clone)]
enum MemoryEntry {
    Text(String),
    /// Present but unreadable; reads fail with this message
    Unreadable(String),
}

/// Store that serves files from memory.
///
/// Directories are implied by the paths of the files added.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, MemoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file.
    pub fn add(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> &mut Self {
        self.files.insert(path.into(), MemoryEntry::Text(content.into()));
        self
    }

    /// Add a file that exists but fails every read with `reason`.
    pub fn add_unreadable(
        &mut self,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> &mut Self {
        self.files.insert(path.into(), MemoryEntry::Unreadable(reason.into()));
        self
    }

    /// Create a store with the given files.
    pub fn with_files(
        files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<String>)>,
    ) -> Self {
        let mut store = Self::new();
        for (path, content) in files {
            store.add(path, content);
        }
        store
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files.keys().any(|file| file != path && file.starts_with(path))
    }
}

impl BackingStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_text(&self, path: &Path) -> Result<String, DompileError> {
        match self.files.get(path) {
            Some(MemoryEntry::Text(text)) => Ok(text.clone()),
            Some(MemoryEntry::Unreadable(reason)) => Err(DompileError::Io {
                operation: "read".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::other(reason.clone()),
            }),
            None if self.is_dir(path) => Err(DompileError::NotAFile {
                path: path.to_path_buf(),
            }),
            None => Err(DompileError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, DompileError> {
        if !self.is_dir(dir) {
            return Err(DompileError::NotFound {
                path: dir.to_path_buf(),
            });
        }
        let mut children: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|file| {
                let rest = file.strip_prefix(dir).ok()?;
                let first = rest.components().next()?;
                Some(dir.join(first))
            })
            .collect();
        children.dedup();
        Ok(children)
    }
}
