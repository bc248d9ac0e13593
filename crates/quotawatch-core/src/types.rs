//! Normalized results handed to the presentation layer
//!
//! These are derived on every poll and owned by the caller. None of them is
//! authoritative; `raw_response` keeps the untouched payload for inspection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Subscription level of the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Ultra,
    Pro,
    Free,
    #[default]
    Unknown,
}

impl Tier {
    /// Classify a paid-tier identifier by ordered, case-insensitive substring
    /// match: `ultra`, then `pro`/`premium`, then `free`.
    pub fn classify(paid_tier_id: &str) -> Self {
        let id = paid_tier_id.to_lowercase();
        if id.contains("ultra") {
            Tier::Ultra
        } else if id.contains("pro") || id.contains("premium") {
            Tier::Pro
        } else if id.contains("free") {
            Tier::Free
        } else {
            Tier::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Ultra => "ultra",
            Tier::Pro => "pro",
            Tier::Free => "free",
            Tier::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the tier and project lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub tier: Tier,
    pub paid_tier_id: Option<String>,
    pub project_id: Option<String>,
    pub raw_response: Option<Value>,
    pub host: String,
}

/// Result of the available-models lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsInfo {
    /// Model key to opaque descriptor
    pub models: Map<String, Value>,
    pub raw_response: Option<Value>,
    pub host: String,
}

impl ModelsInfo {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
