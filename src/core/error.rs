//! Error types shared by the HTTP pipeline, the session store and the auth context.

use serde_json::Value;

/// Fallback shown to users when the server gave no readable message
pub const GENERIC_FAILURE: &str = "Request failed";

/// Field errors checked first when the server answers with per-field validation errors
const PREFERRED_FIELDS: [&str; 3] = ["username", "email", "password"];

/// Persistence errors from cookie or local cache backends
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,

    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to serialize {key}: {reason}")]
    Serialize { key: String, reason: String },
}

/// Errors surfaced by API calls and auth operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Network unreachable, timeout, or the transport itself failed
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("{message} (status {status})")]
    Status {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Rejected locally before any request was sent
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No refresh credential, or the refresh endpoint rejected it
    #[error("Session expired")]
    SessionExpired,

    /// The session changed (logout) while the operation was in flight
    #[error("Operation superseded by a newer session change")]
    Superseded,
}

impl ApiError {
    /// Build a status error from a raw response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = parse_body(body);
        let message = server_message(&body).unwrap_or_else(|| GENERIC_FAILURE.to_string());
        ApiError::Status {
            status,
            message,
            body,
        }
    }

    /// HTTP status, if this error came from a server response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Human readable message for inline notifications.
    ///
    /// Prefers the server-provided message and falls back to [`GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Validation(message) => message.clone(),
            ApiError::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Parse a response body as JSON, keeping non-JSON text as a string value.
pub(crate) fn parse_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Extract the message a user should see from an error body.
///
/// Understands `{"error": ..}`, `{"detail": ..}`, `{"message": ..}`,
/// `{"non_field_errors": [..]}` and per-field error lists.
pub fn server_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) if !text.is_empty() && !text.starts_with('<') => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(server_message),
        Value::Object(map) => {
            for key in ["error", "detail", "message"] {
                if let Some(Value::String(text)) = map.get(key) {
                    if !text.is_empty() {
                        return Some(text.clone());
                    }
                }
            }
            if let Some(message) = map.get("non_field_errors").and_then(server_message) {
                return Some(message);
            }
            for field in PREFERRED_FIELDS {
                if let Some(message) = map.get(field).and_then(first_string) {
                    return Some(message);
                }
            }
            map.values().find_map(first_string)
        }
        _ => None,
    }
}

fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}
