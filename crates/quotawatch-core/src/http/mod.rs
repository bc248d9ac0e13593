//! HTTP request layer for Cloud Code endpoints
//!
//! This module provides:
//! - The fixed identification header set
//! - Host selection from the configured mode
//! - Failure classification and message extraction
//! - A timeout-bounded, multi-host failover client

pub mod client;
pub mod error;
pub mod headers;
pub mod hosts;
pub mod timeout;

pub use client::{HttpClient, HttpClientConfig, PostSuccess, RequestDescriptor};
pub use error::{ErrorBody, FailureKind, RequestFailure};
pub use headers::{ClientMetadata, HeaderPolicy, HeaderSet};
pub use hosts::{select_hosts, HostList, DAILY_HOST, PRIMARY_HOST};

// Re-export commonly used types
pub use reqwest::StatusCode;
