//! Request bodies and response texts for the relay endpoints.
//!
//! `POST /parse`:
//!
//! ```json
//! { "urls": ["https://t.me/somechat", "someuser"], "bundle": "2024-05-01-run" }
//! ```
//!
//! `POST /{bundle}/save`:
//!
//! ```json
//! { "jsonData": { "...": "any worker result" } }
//! ```
//!
//! Both endpoints answer with plain text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_OK: &str = "Requests sent successfully";
pub const SAVE_OK: &str = "Data saved successfully";

/// Raw `/parse` body; fields are checked by [`super::validation`]
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParseBody {
    #[serde(default)]
    pub urls: Option<Value>,
    #[serde(default)]
    pub bundle: Option<Value>,
}

/// Raw `/{bundle}/save` body
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SaveBody {
    #[serde(default, rename = "jsonData")]
    pub json_data: Option<Value>,
}

/// A `/parse` request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest {
    pub urls: Vec<String>,
    pub bundle: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_body_uses_camel_case_key() {
        let body: SaveBody = serde_json::from_value(json!({"jsonData": {"x": 1}})).unwrap();
        assert_eq!(body.json_data, Some(json!({"x": 1})));

        let body: SaveBody = serde_json::from_value(json!({"json_data": {"x": 1}})).unwrap();
        assert_eq!(body.json_data, None);
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let body: ParseBody = serde_json::from_value(json!({"urls": null})).unwrap();
        assert!(body.urls.is_none());
        assert!(body.bundle.is_none());
    }
}
