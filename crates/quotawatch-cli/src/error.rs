//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from quotawatch-core
    #[error("{0}")]
    Core(#[from] quotawatch_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No access token from any source
    #[error("No access token. Pass --token, set QUOTAWATCH_ACCESS_TOKEN or use --token-file")]
    MissingToken,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(core) => match core {
                quotawatch_core::Error::Request(failure) if !failure.should_failover() => 3,
                quotawatch_core::Error::Request(_) => 4,
                quotawatch_core::Error::Identity { .. } => 3,
                _ => 2,
            },
            Self::FileNotFound { .. } => 5,
            Self::Config(_) => 6,
            Self::MissingToken => 7,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) => 14,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::MissingToken)
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let detail = match error {
        Error::Core(quotawatch_core::Error::Request(failure)) => failure
            .status_code
            .map(|status| format!(" ({}, HTTP {})", failure.host, status))
            .unwrap_or_else(|| format!(" ({})", failure.host)),
        _ => String::new(),
    };

    if use_color {
        use colored::Colorize;
        format!("{} {}{}", "Error:".red().bold(), error, detail.dimmed())
    } else {
        format!("Error: {}{}", error, detail)
    }
}
