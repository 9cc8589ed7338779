//! API utility functions
//!
//! Stateless helpers for request body handling, kept apart from the handlers
//! so they can be unit tested.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::validation::RequestValidationError;
use crate::api::error::ApiError;

/// Collect a request body, refusing anything over `max_size` bytes
pub async fn read_body(body: axum::body::Body, max_size: usize) -> Result<Vec<u8>, ApiError> {
    let collected = Limited::new(body, max_size).collect().await.map_err(|err| {
        if err.downcast_ref::<LengthLimitError>().is_some() {
            ApiError::PayloadTooLarge(max_size)
        } else {
            ApiError::Internal(err.to_string())
        }
    })?;

    Ok(collected.to_bytes().to_vec())
}

/// Parse a body that must be a JSON object into `T`
pub fn parse_json_object<T: DeserializeOwned>(data: &[u8]) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(data)?;
    if !value.is_object() {
        return Err(RequestValidationError::NotAnObject.into());
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ParseBody;

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let body = axum::body::Body::from(vec![b'x'; 1000]);
        let data = read_body(body, 1000).await.unwrap();
        assert_eq!(data.len(), 1000);
    }

    #[tokio::test]
    async fn test_read_body_too_large() {
        let body = axum::body::Body::from(vec![b'x'; 1000]);
        match read_body(body, 999).await {
            Err(ApiError::PayloadTooLarge(limit)) => assert_eq!(limit, 999),
            other => panic!("Expected PayloadTooLarge error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_object() {
        let body: ParseBody = parse_json_object(br#"{"bundle": "b"}"#).unwrap();
        assert_eq!(body.bundle, Some(Value::from("b")));
    }

    #[test]
    fn test_parse_json_object_rejects_non_objects() {
        assert!(matches!(
            parse_json_object::<ParseBody>(br#"[["a"], "b"]"#),
            Err(ApiError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_json_object::<ParseBody>(b"not json"),
            Err(ApiError::InvalidPayload(_))
        ));
    }
}
