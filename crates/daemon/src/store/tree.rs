//! Password tree construction.
//!
//! Walks the store root and produces a [`DirectoryNode`] mapping display
//! names to sub-directories or relative entry paths. Hidden entries
//! (anything starting with `.`, e.g. `.git`, `.gpg-id`) and `README.md`
//! are skipped, as is any file that is not an encrypted entry.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use protocol::{DirectoryNode, TreeNode};
use tracing::{debug, warn};

use super::paths::sanitize;
use super::{StoreRoot, ENTRY_SUFFIX};

/// Default maximum directory depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Builds the password tree for a store root.
///
/// The builder holds no cached state; every call reads the filesystem
/// afresh, so it can be shared freely between concurrent requests.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: StoreRoot,
    max_depth: usize,
}

impl TreeBuilder {
    /// Create a builder for the given root with the default depth limit.
    pub fn new(root: StoreRoot) -> Self {
        Self {
            root,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum directory depth.
    ///
    /// Directories nested deeper than this are reported as empty.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The store root this builder walks.
    pub fn root(&self) -> &StoreRoot {
        &self.root
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build the tree for the whole store.
    pub fn build(&self) -> io::Result<DirectoryNode> {
        self.build_subtree("")
    }

    /// Build the tree below a relative sub-path of the store.
    ///
    /// Returns an empty node when the sub-path is not a directory or does not
    /// resolve inside the store. Errors reading a directory listing are
    /// propagated.
    pub fn build_subtree(&self, relative: &str) -> io::Result<DirectoryNode> {
        let relative = match sanitize(relative) {
            s if s == "." => String::new(),
            s => s,
        };
        let mut ancestors = HashSet::new();
        self.walk(&relative, 0, &mut ancestors)
    }

    fn walk(
        &self,
        relative: &str,
        depth: usize,
        ancestors: &mut HashSet<PathBuf>,
    ) -> io::Result<DirectoryNode> {
        let mut node = DirectoryNode::new();

        let lexical = self.root.resolve(relative);
        let canonical = match fs::canonicalize(&lexical) {
            Ok(path) => path,
            Err(_) => {
                debug!("Skipping unresolvable path: {}", lexical.display());
                return Ok(node);
            }
        };

        if !self.is_inside_root(&canonical) || !canonical.is_dir() {
            warn!(
                path = %lexical.display(),
                "Refusing to list path outside store or not a directory"
            );
            return Ok(node);
        }

        if depth > self.max_depth {
            warn!(
                path = %lexical.display(),
                max_depth = self.max_depth,
                "Directory nesting exceeds limit, not descending"
            );
            return Ok(node);
        }

        if !ancestors.insert(canonical.clone()) {
            warn!(path = %lexical.display(), "Symlink cycle detected, not descending");
            return Ok(node);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&canonical)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!("Skipping non-UTF8 name {:?} in {}", raw, lexical.display()),
            }
        }
        names.sort();

        for name in names {
            if is_hidden(&name) {
                continue;
            }

            let child_relative = join_relative(relative, &name);
            let child_path = canonical.join(&name);

            // Follows symlinks; dangling links are skipped.
            let metadata = match fs::metadata(&child_path) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if metadata.is_dir() {
                let subtree = self.walk(&child_relative, depth + 1, ancestors)?;
                node.insert(name, subtree.into());
            } else if metadata.is_file() {
                let Some(display) = name.strip_suffix(ENTRY_SUFFIX) else {
                    continue;
                };
                if !self.entry_inside_root(&child_path) {
                    warn!(path = %child_path.display(), "Entry resolves outside store, skipping");
                    continue;
                }
                let entry_path = child_relative
                    .strip_suffix(ENTRY_SUFFIX)
                    .unwrap_or(&child_relative);
                node.insert(display, TreeNode::entry(entry_path));
            }
        }

        ancestors.remove(&canonical);
        Ok(node)
    }

    fn is_inside_root(&self, canonical: &Path) -> bool {
        canonical == self.root.path() || self.root.contains(canonical)
    }

    fn entry_inside_root(&self, path: &Path) -> bool {
        fs::canonicalize(path)
            .map(|canonical| self.root.contains(&canonical))
            .unwrap_or(false)
    }
}

/// Hidden entries and the store's README are never listed.
fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.eq_ignore_ascii_case("readme.md")
}

fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}
