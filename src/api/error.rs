//! API error normalization.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Coarse classification used to pick a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Request,
    Unknown,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Status { .. } => ErrorKind::Request,
            ApiError::Decode(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message suitable for a toast notification
    pub fn toast_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Status { status: 401, .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ApiError::Status { status: 403, .. } => {
                "You do not have permission to perform this action.".to_string()
            }
            ApiError::Status { status: 404, .. } => {
                "The requested resource was not found.".to_string()
            }
            ApiError::Status { status, .. } if *status >= 500 => {
                "The server encountered an error. Please try again later.".to_string()
            }
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) => "An unexpected error occurred.".to_string(),
        }
    }
}

/// Longest raw body echoed back when the server sent no structured message
const MAX_RAW_MESSAGE_LEN: usize = 200;

/// Extract a readable message from an error response body.
///
/// Looks for `detail`, `message` or `error` in a JSON body (`detail` may be a
/// list of validation errors with `msg` fields), then falls back to a short
/// plain-text body, the status text and finally `HTTP <status>`.
pub fn normalize_error_body(status: u16, status_text: &str, body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            match obj.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
                Some(Value::Array(items)) => {
                    let msgs: Vec<&str> = items
                        .iter()
                        .filter_map(|item| item.get("msg").and_then(Value::as_str))
                        .collect();
                    if !msgs.is_empty() {
                        return msgs.join("; ");
                    }
                }
                _ => {}
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() && body.len() <= MAX_RAW_MESSAGE_LEN && !body.starts_with('{') {
        return body.to_string();
    }

    if !status_text.trim().is_empty() {
        return status_text.trim().to_string();
    }

    format!("HTTP {status}")
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let status_text = response.status_text().to_string();
                let body = response.into_string().unwrap_or_default();
                ApiError::Status {
                    status,
                    message: normalize_error_body(status, &status_text, &body),
                }
            }
            ureq::Error::Transport(transport) => ApiError::Network(transport.to_string()),
        }
    }
}
