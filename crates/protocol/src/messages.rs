//! Request and response bodies for the PassView HTTP API.
//!
//! All bodies are JSON. Optional fields are omitted from the output rather
//! than serialized as `null`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::DirectoryNode;

/// Response body for `GET /api/tree` and `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeResponse {
    /// The (possibly filtered) password tree.
    pub tree: DirectoryNode,
}

/// Request body for `POST /api/search`.
///
/// A missing `query` is an empty query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Case-insensitive substring to match against display names.
    pub query: String,
}

/// Request body for `POST /api/decrypt`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecryptRequest {
    /// Relative entry path, without the `.gpg` suffix.
    pub filepath: Option<String>,
    /// Passphrase for the private key.
    pub passphrase: Option<String>,
}

impl DecryptRequest {
    /// Create a request with both fields set.
    pub fn new(filepath: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            filepath: Some(filepath.into()),
            passphrase: Some(passphrase.into()),
        }
    }

    /// Return `(filepath, passphrase)` if both are present and non-empty.
    pub fn required_fields(&self) -> Option<(&str, &str)> {
        let filepath = self.filepath.as_deref().filter(|s| !s.is_empty())?;
        let passphrase = self.passphrase.as_deref().filter(|s| !s.is_empty())?;
        Some((filepath, passphrase))
    }
}

impl fmt::Debug for DecryptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptRequest")
            .field("filepath", &self.filepath)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Response body for `POST /api/decrypt`, on success and on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptResponse {
    /// Whether decryption succeeded.
    pub success: bool,
    /// Decrypted content (success only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Error message (failure only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecryptResponse {
    /// A successful decryption.
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    /// A failed decryption.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.into()),
        }
    }
}

/// Generic error body for the tree and search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Decode a request or response body from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode a body as JSON bytes.
pub fn to_json_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::tree::TreeNode;

    #[test]
    fn test_search_request_missing_query_is_empty() {
        let req: SearchRequest = from_json_slice(b"{}").unwrap();
        assert_eq!(req.query, "");

        let req: SearchRequest = from_json_slice(br#"{"query":"Wor"}"#).unwrap();
        assert_eq!(req.query, "Wor");
    }

    #[test]
    fn test_decrypt_request_required_fields() {
        let req: DecryptRequest =
            from_json_slice(br#"{"filepath":"email/work","passphrase":"hunter2"}"#).unwrap();
        assert_eq!(req.required_fields(), Some(("email/work", "hunter2")));

        let req: DecryptRequest = from_json_slice(br#"{"filepath":"email/work"}"#).unwrap();
        assert_eq!(req.required_fields(), None);

        let req = DecryptRequest::new("", "hunter2");
        assert_eq!(req.required_fields(), None);

        let req: DecryptRequest =
            from_json_slice(br#"{"filepath":null,"passphrase":"x"}"#).unwrap();
        assert_eq!(req.required_fields(), None);
    }

    #[test]
    fn test_decrypt_request_debug_redacts_passphrase() {
        let req = DecryptRequest::new("email/work", "hunter2");
        let debug = format!("{:?}", req);
        assert!(debug.contains("email/work"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_decrypt_response_shapes() {
        let ok = serde_json::to_value(DecryptResponse::ok("secret")).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "content": "secret"}));

        let failed = serde_json::to_value(DecryptResponse::failed("nope")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "error": "nope"}));
    }

    #[test]
    fn test_tree_response_shape() {
        let mut tree = DirectoryNode::new();
        tree.insert("bank", TreeNode::entry("bank"));
        let bytes = to_json_vec(&TreeResponse { tree }).unwrap();
        assert_eq!(bytes, br#"{"tree":{"bank":"bank"}}"#);
    }

    #[test]
    fn test_error_response_shape() {
        let value = serde_json::to_value(ErrorResponse::new("Failed to load password tree."))
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"error": "Failed to load password tree."})
        );
    }

    #[test]
    fn test_malformed_body_is_deserialization_error() {
        let result = from_json_slice::<SearchRequest>(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Deserialization(_))));
    }
}
