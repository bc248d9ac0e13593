//! Shared utilities for command handlers

use crate::error::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Resolve the access token: an explicit value (flag or environment) wins,
/// then the token file.
pub fn resolve_token(explicit: Option<&str>, token_file: Option<&Path>) -> Result<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    match token_file {
        Some(path) => read_token_file(path),
        None => Err(Error::MissingToken),
    }
}

/// Read a token file: a JSON object with `access_token`, or the raw token
pub fn read_token_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_token_document(&content).ok_or(Error::MissingToken)
}

fn parse_token_document(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => map
            .get("access_token")
            .or_else(|| map.get("accessToken"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        Ok(Value::String(token)) => Some(token).filter(|t| !t.is_empty()),
        _ => Some(trimmed.to_string()),
    }
}
