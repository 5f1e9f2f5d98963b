//! Error types and API error codes

use crate::middleware::REQUEST_ID_HEADER;
use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use cryptdrop_core::CoreError;
use serde::Serialize;
use thiserror::Error;

/// API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoFileSelected,
    FileTypeNotAllowed,
    FileTooLarge,
    InvalidFilename,
    InvalidFileId,
    InvalidRequest,
    NotFound,
    KeyNotFound,
    KeyMissing,
    DecryptionFailed,
    CorruptEnvelope,
    InternalError,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoFileSelected => "NoFileSelected",
            Self::FileTypeNotAllowed => "FileTypeNotAllowed",
            Self::FileTooLarge => "FileTooLarge",
            Self::InvalidFilename => "InvalidFilename",
            Self::InvalidFileId => "InvalidFileId",
            Self::InvalidRequest => "InvalidRequest",
            Self::NotFound => "NotFound",
            Self::KeyNotFound => "KeyNotFound",
            Self::KeyMissing => "KeyMissing",
            Self::DecryptionFailed => "DecryptionFailed",
            Self::CorruptEnvelope => "CorruptEnvelope",
            Self::InternalError => "InternalError",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFileSelected
            | Self::FileTypeNotAllowed
            | Self::InvalidFilename
            | Self::InvalidFileId
            | Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::KeyNotFound | Self::KeyMissing => StatusCode::NOT_FOUND,
            Self::DecryptionFailed | Self::CorruptEnvelope => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Api {
        code: ErrorCode,
        message: String,
        request_id: String,
    },

    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new API error
    pub fn api(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Api { code, .. } => *code,
            Self::Core(e) => match e {
                CoreError::ExtensionNotAllowed { .. } => ErrorCode::FileTypeNotAllowed,
                CoreError::FileTooLarge { .. } => ErrorCode::FileTooLarge,
                CoreError::InvalidFilename(_) => ErrorCode::InvalidFilename,
                CoreError::InvalidFileId(_) => ErrorCode::InvalidFileId,
                CoreError::NotFound(_) => ErrorCode::NotFound,
                CoreError::KeyNotFound(_) => ErrorCode::KeyNotFound,
                CoreError::KeyMissing(_) => ErrorCode::KeyMissing,
                CoreError::DecryptionFailed(_) => ErrorCode::DecryptionFailed,
                CoreError::CorruptEnvelope(_) => ErrorCode::CorruptEnvelope,
                CoreError::KeyCorrupt { .. } | CoreError::Io(_) | CoreError::Crypto(_) => {
                    ErrorCode::InternalError
                }
            },
            Self::Join(_) | Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show to a client
    fn public_message(&self) -> String {
        match self.error_code() {
            ErrorCode::InternalError => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    request_id: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = code.status_code();
        let request_id = match &self {
            ApiError::Api { request_id, .. } => request_id.clone(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, request_id = %request_id, "Request failed");
        } else {
            tracing::debug!(error = %self, code = code.as_str(), "Request rejected");
        }

        let body = ErrorBody {
            error: code.as_str(),
            message: self.public_message(),
            request_id: &request_id,
        };

        let mut response = (status, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptdrop_core::FileId;
    use rstest::rstest;

    #[rstest]
    #[case(CoreError::FileTooLarge { max: 1 }, StatusCode::PAYLOAD_TOO_LARGE)]
    #[case(CoreError::InvalidFilename("..".into()), StatusCode::BAD_REQUEST)]
    #[case(CoreError::InvalidFileId("x".into()), StatusCode::BAD_REQUEST)]
    #[case(CoreError::NotFound(FileId::generate()), StatusCode::NOT_FOUND)]
    #[case(CoreError::KeyMissing(FileId::generate()), StatusCode::NOT_FOUND)]
    #[case(CoreError::DecryptionFailed(FileId::generate()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(CoreError::CorruptEnvelope(FileId::generate()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(CoreError::Io(std::io::Error::other("disk")), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_core_error_status(#[case] error: CoreError, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(error).error_code().status_code(), expected);
    }

    #[test]
    fn test_extension_error_maps_to_bad_request() {
        let err = ApiError::from(CoreError::ExtensionNotAllowed {
            extension: "exe".into(),
            allowed: "txt".into(),
        });
        assert_eq!(err.error_code(), ErrorCode::FileTypeNotAllowed);
        assert_eq!(err.error_code().status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from(CoreError::Io(std::io::Error::other("/secret/path")));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_response_carries_request_id() {
        let err = ApiError::api(ErrorCode::NoFileSelected, "No file selected");
        let request_id = match &err {
            ApiError::Api { request_id, .. } => request_id.clone(),
            _ => unreachable!(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            request_id.as_str()
        );
    }
}
