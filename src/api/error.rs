use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::validation::RequestValidationError;
use crate::dispatch::DispatchError;
use crate::storage::SinkError;

pub const DUPLICATE_BUNDLE_MESSAGE: &str = "Bundle directory already exists, please rename";
const INTERNAL_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("bundle already exists: {0}")]
    DuplicateBundle(String),
    #[error("payload exceeds {0} bytes")]
    PayloadTooLarge(usize),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) | ApiError::DuplicateBundle(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body shown to the caller; internal detail stays in the log.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::DuplicateBundle(_) => DUPLICATE_BUNDLE_MESSAGE.to_string(),
            ApiError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        (status, self.public_message()).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<RequestValidationError> for ApiError {
    fn from(value: RequestValidationError) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<DispatchError> for ApiError {
    fn from(value: DispatchError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl From<SinkError> for ApiError {
    fn from(value: SinkError) -> Self {
        match value {
            SinkError::InvalidBundle(_) => RequestValidationError::InvalidBundleName.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidPayload("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateBundle("b".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadTooLarge(10).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::Internal("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::Internal("failed to read /etc/relay/servers.json".into());
        assert_eq!(err.public_message(), "Internal Server Error");
    }

    #[test]
    fn test_dispatch_errors_are_internal() {
        let err: ApiError = DispatchError::MissingSession { index: 3 }.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_invalid_bundle_from_sink_is_bad_request() {
        let err: ApiError = SinkError::InvalidBundle("..".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid bundle name");
    }
}
