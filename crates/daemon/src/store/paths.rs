//! Lexical path handling.
//!
//! Nothing in this module touches the filesystem. [`sanitize`] only cleans
//! the format of user input; containment is verified separately with
//! [`is_strict_descendant`] once the fragment has been joined to the root.

use std::path::{Component, Path, PathBuf};

/// Normalize a `/`-separated path string.
///
/// Collapses redundant separators and `.` segments and resolves `..`
/// against preceding segments. Leading `..` segments of a relative path
/// are kept; `..` at the root of an absolute path is dropped. An empty
/// result is `"."`.
pub fn normalize_lexical(raw: &str) -> String {
    if raw.is_empty() {
        return ".".to_string();
    }

    let absolute = raw.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Clean a user-supplied relative entry path.
///
/// Normalizes the input, then strips one leading and one trailing separator
/// (`/` or `\`). Never fails. The result may still point outside the store
/// (e.g. `../../etc/passwd`); callers must check containment.
pub fn sanitize(raw: &str) -> String {
    let normalized = normalize_lexical(raw);
    let mut cleaned = normalized.as_str();

    if let Some(rest) = cleaned.strip_prefix(['/', '\\']) {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix(['/', '\\']) {
        cleaned = rest;
    }

    cleaned.to_string()
}

/// Normalize a path by resolving `.` and `..` components without filesystem access.
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Check that `path` lies strictly below `root`, comparing whole components.
///
/// `/store-old/x` is not inside `/store`, and `/store` is not inside itself.
pub fn is_strict_descendant(root: &Path, path: &Path) -> bool {
    match path.strip_prefix(root) {
        Ok(rest) => rest.components().next().is_some(),
        Err(_) => false,
    }
}
