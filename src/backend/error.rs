//! Backend error types

use serde_json::Value;
use thiserror::Error;

/// Fallback shown when the backend gives no readable reason
pub const GENERIC_SERVER_ERROR: &str = "Server Error";

/// Errors that can occur when talking to the DocAssist backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl BackendError {
    /// Classify a transport-level failure
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Request(err)
        }
    }

    /// Build an API error from a non-2xx response body
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        BackendError::Api {
            status,
            message: extract_message(body),
        }
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Understands `{"detail": "..."}` and validation errors of the form
/// `{"detail": [{"msg": "..."}]}`.
pub fn extract_message(body: &str) -> String {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return GENERIC_SERVER_ERROR.to_string(),
    };

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string()),
        _ => GENERIC_SERVER_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_detail() {
        assert_eq!(
            extract_message(r#"{"detail": "Appointment not found"}"#),
            "Appointment not found"
        );
    }

    #[test]
    fn test_extract_validation_detail() {
        let body = r#"{"detail": [{"loc": ["body", "patient_id"], "msg": "field required"}]}"#;
        assert_eq!(extract_message(body), "field required");
    }

    #[test]
    fn test_extract_falls_back() {
        assert_eq!(extract_message("<html>502</html>"), GENERIC_SERVER_ERROR);
        assert_eq!(extract_message(r#"{"detail": []}"#), GENERIC_SERVER_ERROR);
        assert_eq!(extract_message(r#"{"error": "x"}"#), GENERIC_SERVER_ERROR);
    }

    #[test]
    fn test_error_display() {
        let err = BackendError::from_body(404, r#"{"detail": "Appointment not found"}"#);
        assert_eq!(err.to_string(), "API error 404: Appointment not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(BackendError::Timeout.status(), None);
    }
}
