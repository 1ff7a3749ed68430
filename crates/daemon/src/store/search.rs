//! Name search over a password tree.

use protocol::{DirectoryNode, TreeNode};

/// Filter a tree down to the nodes whose display name contains `query`,
/// ignoring case.
///
/// Entries are kept individually. A directory is kept with its filtered
/// contents when anything below it matches; otherwise, if the directory's
/// own name matches, it is kept with its full, unfiltered contents.
///
/// The empty query matches every name, so `filter(tree, "")` returns the
/// tree unchanged.
pub fn filter(tree: &DirectoryNode, query: &str) -> DirectoryNode {
    filter_lowercase(tree, &query.to_lowercase())
}

fn filter_lowercase(tree: &DirectoryNode, needle: &str) -> DirectoryNode {
    let mut result = DirectoryNode::new();

    for (name, node) in tree.iter() {
        let name_matches = name.to_lowercase().contains(needle);

        match node {
            TreeNode::Directory(children) => {
                let filtered = filter_lowercase(children, needle);
                if !filtered.is_empty() {
                    result.insert(name, filtered.into());
                } else if name_matches {
                    result.insert(name, node.clone());
                }
            }
            TreeNode::Entry(_) => {
                if name_matches {
                    result.insert(name, node.clone());
                }
            }
        }
    }

    result
}
