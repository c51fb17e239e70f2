//! Normalized responses from the remote API

use serde_json::Value;

/// Response body, parsed as JSON when possible
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

/// A response from the remote API, normalized across methods
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl ApiResponse {
    pub fn new(status: u16, body: Body) -> Self {
        Self { status, body }
    }

    /// Build a response from raw body bytes, keeping non-JSON bodies as text
    pub fn from_bytes(status: u16, bytes: &[u8]) -> Self {
        let body = match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(String::from_utf8_lossy(bytes).into_owned()),
        };
        Self { status, body }
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// Top-level member of a JSON object body
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.json().and_then(|value| value.get(key))
    }

    /// The `error` member the service uses for 4xx/5xx bodies
    pub fn error_message(&self) -> Option<&str> {
        self.field("error").and_then(Value::as_str)
    }

    /// Body as a JSON value for attaching to a test record
    pub fn payload(&self) -> Value {
        match &self.body {
            Body::Json(value) => value.clone(),
            Body::Text(text) => Value::String(text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_is_parsed() {
        let response = ApiResponse::from_bytes(400, br#"{"error":"Content validation failed"}"#);
        assert_eq!(response.error_message(), Some("Content validation failed"));
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_text_body_is_kept() {
        let response = ApiResponse::from_bytes(502, b"<html>Bad Gateway</html>");
        assert_eq!(response.body, Body::Text("<html>Bad Gateway</html>".to_string()));
        assert!(response.json().is_none());
        assert!(response.field("error").is_none());
        assert_eq!(response.payload(), json!("<html>Bad Gateway</html>"));
    }

    #[test]
    fn test_empty_body_is_text() {
        let response = ApiResponse::from_bytes(204, b"");
        assert_eq!(response.body, Body::Text(String::new()));
        assert_eq!(response.status, 204);
    }
}
