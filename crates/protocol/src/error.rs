//! Error types for the protocol crate.
//!
//! [`ErrorKind`] is the taxonomy every API failure is reduced to before it
//! reaches a client. [`ProtocolError`] covers encoding and decoding of the
//! wire types themselves.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-facing message for a request missing `filepath` or `passphrase`.
pub const MSG_MISSING_FIELDS: &str = "File path and passphrase are required.";
/// Client-facing message for a path outside the store or a missing entry.
pub const MSG_INVALID_PATH: &str = "Invalid file path.";
/// Client-facing message for a rejected passphrase.
pub const MSG_BAD_PASSPHRASE: &str = "Incorrect passphrase. Please try again.";
/// Client-facing message when the private key is not available.
pub const MSG_MISSING_KEY: &str =
    "Missing secret key for this file. Make sure your GPG key is available on the server.";
/// Client-facing message for any other decryption failure.
pub const MSG_DECRYPTION_FAILED: &str = "Decryption failed due to an unexpected error.";
/// Client-facing message for unexpected failures during decryption.
pub const MSG_DECRYPT_INTERNAL: &str = "Unexpected server error occurred during decryption.";
/// Client-facing message when the tree cannot be built.
pub const MSG_TREE_FAILED: &str = "Failed to load password tree.";
/// Client-facing message when a search cannot be performed.
pub const MSG_SEARCH_FAILED: &str = "Failed to perform search.";

/// Failure categories surfaced by the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required request field was absent or empty.
    MissingField,
    /// The requested entry is outside the store or does not exist.
    InvalidPath,
    /// The decryption tool rejected the passphrase.
    BadPassphrase,
    /// The private key needed for the entry is not available.
    MissingKey,
    /// The decryption tool failed for another reason.
    DecryptionFailed,
    /// Unexpected server-side failure.
    InternalError,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::MissingField => 400,
            ErrorKind::BadPassphrase => 401,
            ErrorKind::InvalidPath => 403,
            ErrorKind::MissingKey | ErrorKind::DecryptionFailed | ErrorKind::InternalError => 500,
        }
    }

    /// Message returned to clients of the decrypt endpoint.
    pub fn decrypt_message(self) -> &'static str {
        match self {
            ErrorKind::MissingField => MSG_MISSING_FIELDS,
            ErrorKind::InvalidPath => MSG_INVALID_PATH,
            ErrorKind::BadPassphrase => MSG_BAD_PASSPHRASE,
            ErrorKind::MissingKey => MSG_MISSING_KEY,
            ErrorKind::DecryptionFailed => MSG_DECRYPTION_FAILED,
            ErrorKind::InternalError => MSG_DECRYPT_INTERNAL,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MissingField => "missing field",
            ErrorKind::InvalidPath => "invalid path",
            ErrorKind::BadPassphrase => "bad passphrase",
            ErrorKind::MissingKey => "missing key",
            ErrorKind::DecryptionFailed => "decryption failed",
            ErrorKind::InternalError => "internal error",
        };
        f.write_str(name)
    }
}

/// Protocol error type for encoding and decoding wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to serialize data.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Failed to deserialize data.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_eof() || err.is_syntax() {
            ProtocolError::Deserialization(err.to_string())
        } else {
            ProtocolError::Serialization(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::MissingField.status_code(), 400);
        assert_eq!(ErrorKind::BadPassphrase.status_code(), 401);
        assert_eq!(ErrorKind::InvalidPath.status_code(), 403);
        assert_eq!(ErrorKind::MissingKey.status_code(), 500);
        assert_eq!(ErrorKind::DecryptionFailed.status_code(), 500);
        assert_eq!(ErrorKind::InternalError.status_code(), 500);
    }

    #[test]
    fn test_decrypt_messages() {
        assert_eq!(
            ErrorKind::MissingField.decrypt_message(),
            "File path and passphrase are required."
        );
        assert_eq!(ErrorKind::InvalidPath.decrypt_message(), "Invalid file path.");
        assert!(ErrorKind::BadPassphrase
            .decrypt_message()
            .starts_with("Incorrect passphrase"));
    }

    #[test]
    fn test_internal_messages_carry_no_detail() {
        assert!(!MSG_DECRYPT_INTERNAL.contains('/'));
        assert!(!MSG_TREE_FAILED.contains('/'));
        assert!(!MSG_SEARCH_FAILED.contains('/'));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::BadPassphrase).unwrap();
        assert_eq!(json, "\"bad_passphrase\"");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::InvalidPath.to_string(), "invalid path");
        assert_eq!(ErrorKind::MissingKey.to_string(), "missing key");
    }

    #[test]
    fn test_deserialization_error_display() {
        let err = ProtocolError::Deserialization("unexpected end of input".to_string());
        assert_eq!(
            err.to_string(),
            "deserialization failed: unexpected end of input"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let protocol_err: ProtocolError = json_err.into();
        assert!(matches!(protocol_err, ProtocolError::Deserialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProtocolError>();
    }
}
