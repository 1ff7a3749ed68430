//! # PassView Protocol Library
//!
//! Wire types shared between the PassView daemon and its clients.
//!
//! ## Overview
//!
//! - **Tree Types**: [`TreeNode`] and [`DirectoryNode`], the nested
//!   display-name → entry mapping returned by the tree and search endpoints
//! - **Messages**: JSON request and response bodies for every endpoint
//! - **Errors**: the [`ErrorKind`] taxonomy with its HTTP status mapping
//!
//! ## Example Usage
//!
//! ```rust
//! use protocol::{DirectoryNode, TreeNode, TreeResponse};
//!
//! let mut email = DirectoryNode::new();
//! email.insert("work", TreeNode::entry("email/work"));
//!
//! let mut tree = DirectoryNode::new();
//! tree.insert("email", email.into());
//!
//! let json = serde_json::to_string(&TreeResponse { tree }).unwrap();
//! assert_eq!(json, r#"{"tree":{"email":{"work":"email/work"}}}"#);
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: Password tree types
//! - [`messages`]: Request and response bodies
//! - [`error`]: Error types

pub mod error;
pub mod messages;
pub mod tree;

pub use error::{ErrorKind, ProtocolError, Result};
pub use messages::{
    from_json_slice, to_json_vec, DecryptRequest, DecryptResponse, ErrorResponse, SearchRequest,
    TreeResponse,
};
pub use tree::{DirectoryNode, TreeNode};
