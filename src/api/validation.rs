use serde_json::Value;
use thiserror::Error;

use super::models::{ParseBody, ParseRequest, SaveBody};
use crate::storage::is_valid_bundle;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("Invalid URLs array")]
    InvalidUrls,
    #[error("Bundle not defined")]
    MissingBundle,
    #[error("Invalid bundle name")]
    InvalidBundleName,
    #[error("Bundle and jsonData are required")]
    MissingJsonData,
    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// `urls` must be a non-empty array of strings; `bundle` a non-empty string
/// naming a single directory.
pub fn validate_parse_request(body: ParseBody) -> Result<ParseRequest, RequestValidationError> {
    let urls = match body.urls {
        Some(Value::Array(items)) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(RequestValidationError::InvalidUrls),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(RequestValidationError::InvalidUrls),
    };

    let bundle = match body.bundle {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => return Err(RequestValidationError::MissingBundle),
    };

    if !is_valid_bundle(&bundle) {
        return Err(RequestValidationError::InvalidBundleName);
    }

    Ok(ParseRequest { urls, bundle })
}

/// Whether a JSON value counts as present: `null`, `false`, zero, and empty
/// strings, arrays or objects do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Returns the payload to persist.
pub fn validate_save_request(bundle: &str, body: SaveBody) -> Result<Value, RequestValidationError> {
    let payload = match body.json_data {
        Some(payload) if !bundle.is_empty() && is_truthy(&payload) => payload,
        _ => return Err(RequestValidationError::MissingJsonData),
    };

    if !is_valid_bundle(bundle) {
        return Err(RequestValidationError::InvalidBundleName);
    }

    Ok(payload)
}
