//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use protocol::{DecryptResponse, ErrorKind, ErrorResponse};

use crate::gpg::DecryptError;

/// An error returned by an API handler.
///
/// Carries only the client-facing message; internal detail is logged where
/// the error is produced and never copied in here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    decrypt: bool,
}

impl ApiError {
    /// An error from the tree or search endpoints.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            decrypt: false,
        }
    }

    /// An error from the decrypt endpoint; the body includes `success: false`.
    pub fn decrypt(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.decrypt_message().to_string(),
            decrypt: true,
        }
    }

    /// The error category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// The client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DecryptError> for ApiError {
    fn from(err: DecryptError) -> Self {
        ApiError::decrypt(err.kind())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.decrypt {
            (status, Json(DecryptResponse::failed(self.message))).into_response()
        } else {
            (status, Json(ErrorResponse::new(self.message))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::error::{MSG_BAD_PASSPHRASE, MSG_TREE_FAILED};

    #[test]
    fn test_decrypt_error_mapping() {
        let err = ApiError::from(DecryptError::BadPassphrase);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), MSG_BAD_PASSPHRASE);

        let err = ApiError::from(DecryptError::InvalidPath("../../etc/passwd".into()));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(!err.message().contains("passwd"));

        let err = ApiError::from(DecryptError::MissingKey);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), ErrorKind::MissingKey);
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::from(DecryptError::Failed {
            stderr: "gpg: can't open '/home/alice/.password-store/x.gpg'".into(),
        });
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
        assert!(!err.message().contains("/home/alice"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::decrypt(ErrorKind::MissingField).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::new(ErrorKind::InternalError, MSG_TREE_FAILED).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::decrypt(ErrorKind::InvalidPath).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ApiError::new(ErrorKind::InternalError, MSG_TREE_FAILED).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
