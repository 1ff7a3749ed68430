//! Password tree types.
//!
//! A password store is exposed to clients as a nested JSON object: directory
//! names map to nested objects, entry names map to the entry's relative path
//! (without the `.gpg` suffix). The [`TreeNode`] enum makes the two cases
//! explicit, and [`DirectoryNode`] keeps children in insertion order so the
//! filesystem sort order survives serialization.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A node in the password tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// A directory with its (possibly empty) children.
    Directory(DirectoryNode),
    /// An entry, identified by its relative path without suffix.
    Entry(String),
}

impl TreeNode {
    /// Create an entry node from a relative entry path.
    pub fn entry(path: impl Into<String>) -> Self {
        Self::Entry(path.into())
    }

    /// Check if this node is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Borrow the directory contents, if this is a directory.
    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::Entry(_) => None,
        }
    }

    /// Borrow the relative entry path, if this is an entry.
    pub fn as_entry(&self) -> Option<&str> {
        match self {
            Self::Entry(path) => Some(path),
            Self::Directory(_) => None,
        }
    }
}

impl From<DirectoryNode> for TreeNode {
    fn from(dir: DirectoryNode) -> Self {
        Self::Directory(dir)
    }
}

/// An insertion-ordered mapping from display name to child node.
///
/// Serializes as a JSON object whose keys appear in insertion order.
/// Inserting an existing name replaces the node but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    children: Vec<(String, TreeNode)>,
}

impl DirectoryNode {
    /// Create an empty directory node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `node`, returning the previous node for that name.
    pub fn insert(&mut self, name: impl Into<String>, node: TreeNode) -> Option<TreeNode> {
        let name = name.into();
        match self.children.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, node)),
            None => {
                self.children.push((name, node));
                None
            }
        }
    }

    /// Look up a child by display name.
    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.children
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    /// Check if a child with this display name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterate over `(name, node)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Display names of direct children, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.children.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Total number of entries in this subtree.
    pub fn entry_count(&self) -> usize {
        self.children
            .iter()
            .map(|(_, node)| match node {
                TreeNode::Directory(dir) => dir.entry_count(),
                TreeNode::Entry(_) => 1,
            })
            .sum()
    }
}

impl IntoIterator for DirectoryNode {
    type Item = (String, TreeNode);
    type IntoIter = std::vec::IntoIter<(String, TreeNode)>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, TreeNode)> for DirectoryNode {
    fn from_iter<I: IntoIterator<Item = (K, TreeNode)>>(iter: I) -> Self {
        let mut dir = DirectoryNode::new();
        for (name, node) in iter {
            dir.insert(name, node);
        }
        dir
    }
}

impl Serialize for DirectoryNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (name, node) in &self.children {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DirectoryNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DirectoryVisitor;

        impl<'de> Visitor<'de> for DirectoryVisitor {
            type Value = DirectoryNode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of display names to tree nodes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut dir = DirectoryNode::new();
                while let Some((name, node)) = access.next_entry::<String, TreeNode>()? {
                    dir.insert(name, node);
                }
                Ok(dir)
            }
        }

        deserializer.deserialize_map(DirectoryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DirectoryNode {
        let mut email = DirectoryNode::new();
        email.insert("work", TreeNode::entry("email/work"));
        email.insert("personal", TreeNode::entry("email/personal"));

        let mut root = DirectoryNode::new();
        root.insert("bank", TreeNode::entry("bank"));
        root.insert("email", email.into());
        root.insert("empty", DirectoryNode::new().into());
        root
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let json = serde_json::to_string(&sample_tree()).unwrap();
        assert_eq!(
            json,
            r#"{"bank":"bank","email":{"work":"email/work","personal":"email/personal"},"empty":{}}"#
        );
    }

    #[test]
    fn test_deserialize_distinguishes_variants() {
        let json = r#"{"email":{"work":"email/work"},"bank":"bank","empty":{}}"#;
        let tree: DirectoryNode = serde_json::from_str(json).unwrap();

        assert_eq!(tree.names(), vec!["email", "bank", "empty"]);
        assert!(tree.get("email").unwrap().is_directory());
        assert_eq!(tree.get("bank").unwrap().as_entry(), Some("bank"));
        assert!(tree.get("empty").unwrap().as_directory().unwrap().is_empty());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut dir = DirectoryNode::new();
        dir.insert("a", DirectoryNode::new().into());
        dir.insert("b", TreeNode::entry("b"));

        let previous = dir.insert("a", TreeNode::entry("a"));

        assert!(previous.unwrap().is_directory());
        assert_eq!(dir.names(), vec!["a", "b"]);
        assert_eq!(dir.get("a").unwrap().as_entry(), Some("a"));
    }

    #[test]
    fn test_entry_count() {
        assert_eq!(sample_tree().entry_count(), 3);
        assert_eq!(DirectoryNode::new().entry_count(), 0);
    }

    #[test]
    fn test_from_iterator() {
        let dir: DirectoryNode = vec![("x", TreeNode::entry("x")), ("y", TreeNode::entry("y"))]
            .into_iter()
            .collect();
        assert_eq!(dir.len(), 2);
        assert!(dir.contains("y"));
        assert!(!dir.contains("z"));
    }

    #[test]
    fn test_rejects_non_string_leaf() {
        let result = serde_json::from_str::<DirectoryNode>(r#"{"a": 42}"#);
        assert!(result.is_err());
    }
}
