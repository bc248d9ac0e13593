//! Failure classification for the resilient request client
//!
//! Decides, per attempt, whether a failure is worth trying on the next host
//! and extracts the richest available message from an error response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Number of characters of a raw error body used as a message
const RAW_MESSAGE_CHARS: usize = 200;

/// Classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// No response: connection, DNS, TLS or body read failure
    Network,
    /// The attempt was aborted by its timeout
    Timeout,
    /// Status >= 500
    ServerError,
    /// Any other non-success status; reproduces on every host
    ClientError,
}

impl FailureKind {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16) -> Self {
        if status < 500 {
            FailureKind::ClientError
        } else {
            FailureKind::ServerError
        }
    }

    /// Whether the next host should be tried after this failure
    pub fn should_failover(&self) -> bool {
        !matches!(self, FailureKind::ClientError)
    }
}

/// Error payload as received: parsed JSON when possible, raw text otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Json(Value),
    Text(String),
}

impl ErrorBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ErrorBody::Json(v) => Some(v),
            ErrorBody::Text(_) => None,
        }
    }
}

/// A failed attempt against one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub status_code: Option<u16>,
    pub message: String,
    pub body: Option<ErrorBody>,
    pub host: String,
}

impl RequestFailure {
    /// Build from a non-success response whose body has already been read
    pub fn from_response(host: &str, status: u16, text: &str) -> Self {
        let json = parse_json_body(text);
        let message = best_message(json.as_ref(), text, status);
        let body = match json {
            Some(v) => Some(ErrorBody::Json(v)),
            None if !text.is_empty() => Some(ErrorBody::Text(text.to_string())),
            None => None,
        };
        Self {
            kind: FailureKind::from_status(status),
            status_code: Some(status),
            message,
            body,
            host: host.to_string(),
        }
    }

    /// Build from a transport-level error
    pub fn network(host: &str, error: &reqwest::Error) -> Self {
        Self {
            kind: if error.is_timeout() {
                FailureKind::Timeout
            } else {
                FailureKind::Network
            },
            status_code: None,
            message: error.to_string(),
            body: None,
            host: host.to_string(),
        }
    }

    /// Build for an attempt aborted by its timeout
    pub fn timeout(host: &str, after: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            status_code: None,
            message: format!("Request to {} timed out after {}ms", host, after.as_millis()),
            body: None,
            host: host.to_string(),
        }
    }

    /// Used only if the host loop ends without any recorded attempt
    pub fn exhausted() -> Self {
        Self {
            kind: FailureKind::Network,
            status_code: None,
            message: "Request failed".to_string(),
            body: None,
            host: String::new(),
        }
    }

    pub fn should_failover(&self) -> bool {
        self.kind.should_failover()
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RequestFailure {}

/// Parse a response body, treating empty, unparsable and `null` bodies as absent
pub fn parse_json_body(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) | Err(_) => None,
        Ok(v) => Some(v),
    }
}

/// Message preference: `error.message`, `error.status`, the start of the raw
/// text, then `HTTP {status}`.
pub fn best_message(json: Option<&Value>, text: &str, status: u16) -> String {
    let structured = json.and_then(|v| v.get("error")).and_then(|error| {
        non_empty_str(error.get("message")).or_else(|| non_empty_str(error.get("status")))
    });
    if let Some(message) = structured {
        return message.to_string();
    }
    if !text.is_empty() {
        return text.chars().take(RAW_MESSAGE_CHARS).collect();
    }
    format!("HTTP {}", status)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
