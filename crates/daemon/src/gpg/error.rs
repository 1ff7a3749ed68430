//! Decryption errors and stderr classification.

use std::io;
use std::time::Duration;

use protocol::ErrorKind;
use thiserror::Error;

/// Errors that can occur while decrypting an entry.
///
/// The `Display` text is for server logs only; clients see the message of
/// the mapped [`ErrorKind`].
#[derive(Debug, Error)]
pub enum DecryptError {
    /// The entry path is outside the store or does not name an existing file.
    #[error("invalid entry path: {0}")]
    InvalidPath(String),

    /// The supplied passphrase was rejected.
    #[error("bad passphrase")]
    BadPassphrase,

    /// No private key is available for the entry.
    #[error("no secret key available")]
    MissingKey,

    /// The decryption tool failed for another reason.
    #[error("decryption tool failed: {stderr}")]
    Failed {
        /// Diagnostic output of the tool.
        stderr: String,
    },

    /// The decryption tool did not finish in time and was killed.
    #[error("decryption timed out after {0:?}")]
    Timeout(Duration),

    /// The tool could not be started or waited on.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Resetting the credential agent failed.
    #[error("failed to reset credential agent: {0}")]
    AgentReset(String),

    /// The decrypted content is not valid UTF-8.
    #[error("decrypted content is not valid UTF-8")]
    InvalidOutput,
}

impl DecryptError {
    /// The API error category for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecryptError::InvalidPath(_) => ErrorKind::InvalidPath,
            DecryptError::BadPassphrase => ErrorKind::BadPassphrase,
            DecryptError::MissingKey => ErrorKind::MissingKey,
            DecryptError::Failed { .. } | DecryptError::Timeout(_) => ErrorKind::DecryptionFailed,
            DecryptError::Spawn { .. }
            | DecryptError::AgentReset(_)
            | DecryptError::InvalidOutput => ErrorKind::InternalError,
        }
    }
}

/// Classify a failed run of the decryption tool from its diagnostic output.
///
/// Missing key material is checked first: gpg reports it as
/// `decryption failed: No secret key`.
pub fn classify_failure(stderr: &str) -> DecryptError {
    let lower = stderr.to_lowercase();

    if lower.contains("no secret key") {
        DecryptError::MissingKey
    } else if lower.contains("bad passphrase") || lower.contains("decryption failed") {
        DecryptError::BadPassphrase
    } else {
        DecryptError::Failed {
            stderr: stderr.trim().to_string(),
        }
    }
}
