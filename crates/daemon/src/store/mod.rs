//! Password store access: root handling, path sanitization, tree building
//! and search.
//!
//! # Security
//!
//! Every path that reaches the filesystem is checked against the canonical
//! store root. User input is first reduced to a clean relative fragment by
//! [`sanitize`], then the joined path is normalized and checked again for
//! containment before it is used.

pub mod paths;
pub mod search;
pub mod tree;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use paths::{is_strict_descendant, normalize_lexical, normalize_path, sanitize};
pub use search::filter;
pub use tree::TreeBuilder;

/// File name suffix of encrypted entries.
pub const ENTRY_SUFFIX: &str = ".gpg";

/// Errors that can occur while opening the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured root does not exist.
    #[error("password store not found at {0}")]
    NotFound(PathBuf),

    /// The configured root exists but is not a directory.
    #[error("password store root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The canonical, absolute root directory of the password store.
///
/// Opened once at startup and shared read-only by every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRoot {
    path: PathBuf,
}

impl StoreRoot {
    /// Canonicalize `path` and verify it is an existing directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let canonical = fs::canonicalize(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_path_buf())
            } else {
                StoreError::Io(e)
            }
        })?;

        if !canonical.is_dir() {
            return Err(StoreError::NotADirectory(canonical));
        }

        Ok(Self { path: canonical })
    }

    /// The canonical root path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lexically resolve a relative fragment against the root.
    ///
    /// The result is absolute and free of `.`/`..` components but is NOT
    /// guaranteed to lie inside the root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        normalize_path(&self.path.join(relative))
    }

    /// Check that `path` lies strictly inside the root.
    pub fn contains(&self, path: &Path) -> bool {
        is_strict_descendant(&self.path, path)
    }

    /// Map an absolute path inside the root to a `/`-separated relative path.
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.path).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_canonicalizes() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("store")).unwrap();

        let root = StoreRoot::open(temp_dir.path().join("store/../store")).unwrap();
        assert_eq!(
            root.path(),
            fs::canonicalize(temp_dir.path().join("store")).unwrap()
        );
        assert!(root.path().is_absolute());
    }

    #[test]
    fn test_open_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = StoreRoot::open(temp_dir.path().join("missing"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_open_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("file"), "x").unwrap();

        let result = StoreRoot::open(temp_dir.path().join("file"));
        assert!(matches!(result, Err(StoreError::NotADirectory(_))));
    }

    #[test]
    fn test_resolve_and_contains() {
        let temp_dir = TempDir::new().unwrap();
        let root = StoreRoot::open(temp_dir.path()).unwrap();

        let inside = root.resolve("email/work.gpg");
        assert!(root.contains(&inside));

        let escaped = root.resolve("../../etc/passwd.gpg");
        assert!(!root.contains(&escaped));

        assert!(!root.contains(root.path()));
    }

    #[test]
    fn test_relative_uses_forward_slashes() {
        let temp_dir = TempDir::new().unwrap();
        let root = StoreRoot::open(temp_dir.path()).unwrap();

        let path = root.path().join("email").join("work");
        assert_eq!(root.relative(&path).as_deref(), Some("email/work"));
        assert_eq!(root.relative(Path::new("/elsewhere")), None);
    }
}
