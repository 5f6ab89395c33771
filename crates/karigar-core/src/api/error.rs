//! Error types for the API client.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by [`ApiClient`](super::ApiClient) calls.
///
/// Failures are local to the triggering call (or, for
/// [`SessionExpired`](ApiError::SessionExpired), to the session); nothing here
/// is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or protocol failure before an HTTP status was received.
    /// Never retried.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Non-2xx response. Validation (4xx) and server (5xx) bodies are
    /// preserved verbatim for display. Never retried.
    #[error("HTTP {status}: {}", summarize(.body))]
    Http { status: u16, body: Value },

    /// The access token was rejected and the refresh exchange also failed.
    /// The session has been cleared; carries the response that triggered it.
    #[error("session expired (HTTP {status}), please log in again")]
    SessionExpired { status: u16, body: Value },

    /// Successful response with a body that did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// The HTTP status of the failing response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::SessionExpired { status, .. } => {
                Some(*status)
            }
            ApiError::Transport(err) | ApiError::Decode(err) => {
                err.status().map(|s| s.as_u16())
            }
            ApiError::Encode(_) => None,
        }
    }

    /// Best-effort human-readable message from a server error body
    /// (`detail`, `error` or `message` keys).
    pub fn server_message(&self) -> Option<&str> {
        let body = match self {
            ApiError::Http { body, .. } | ApiError::SessionExpired { body, .. } => body,
            _ => return None,
        };
        ["detail", "error", "message"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_str))
    }

    /// Structured field errors from a validation response
    /// (`{"field": ["msg", ...]}`), in body order.
    pub fn field_errors(&self) -> Vec<(String, Vec<String>)> {
        let ApiError::Http { body, .. } = self else {
            return Vec::new();
        };
        let Some(map) = body.as_object() else {
            return Vec::new();
        };
        map.iter()
            .filter_map(|(field, value)| {
                let messages: Vec<String> = match value {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    Value::String(message) => vec![message.clone()],
                    _ => return None,
                };
                (!messages.is_empty()).then(|| (field.clone(), messages))
            })
            .collect()
    }
}

/// Compact body summary for error display, preferring the server's own
/// message keys over raw JSON.
fn summarize(body: &Value) -> String {
    for key in ["detail", "error", "message"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let mut rendered = body.to_string();
    if rendered.len() > 200 {
        rendered.truncate(200);
        rendered.push_str("...");
    }
    rendered
}
