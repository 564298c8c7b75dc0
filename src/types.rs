// Application error type and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::documents::DocumentStoreError;
use crate::models::ErrorResponse;
use crate::ocr::VisionError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload exceeds the configured size limit")]
    UploadTooLarge,

    #[error("Storage error")]
    Storage(#[from] StorageError),

    #[error("OCR error")]
    Vision(#[from] VisionError),

    #[error("Document store error")]
    DocumentStore(#[from] DocumentStoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) | AppError::Vision(_) | AppError::DocumentStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message returned to the caller. Upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MissingFile => "No file uploaded".to_string(),
            AppError::InvalidRequest(message) => message.clone(),
            AppError::UploadTooLarge => "Upload too large".to_string(),
            AppError::Storage(_) => "Failed to store upload".to_string(),
            AppError::Vision(_) => "Text detection failed".to_string(),
            AppError::DocumentStore(_) => "Failed to save document".to_string(),
        }
    }
}

/// Renders an error and all of its sources on one line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Upload failed: {}", error_chain(&self));
        } else {
            warn!("Rejected upload: {}", self);
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_requests() {
        assert_eq!(AppError::MissingFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingFile.public_message(), "No file uploaded");
        assert_eq!(
            AppError::InvalidRequest("Uploaded file has no filename".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::UploadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_upstream_errors_hide_details() {
        let err = AppError::from(StorageError::Status {
            status: 403,
            body: "secret bucket policy".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("secret"));
        assert_eq!(err.public_message(), "Failed to store upload");

        let err = AppError::from(VisionError::EmptyResponse);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Text detection failed");

        let err = AppError::from(DocumentStoreError::MissingName);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to save document");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = AppError::from(VisionError::Auth(crate::gcp::AuthError::TokenEndpoint {
            status: 401,
            body: "expired".to_string(),
        }));
        let chain = error_chain(&err);
        assert!(chain.starts_with("OCR error: Vision authentication failed"));
        assert!(chain.ends_with("Token endpoint returned 401: expired"));
    }
}
