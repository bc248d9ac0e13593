//! Quota rows derived from model descriptors
//!
//! Descriptors are loosely specified. Every field is optional and a garbled
//! value degrades to `None`.

use crate::extract::{first_present, FieldPath};
use crate::types::ModelsInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const LABEL_PATHS: &[FieldPath] = &[FieldPath(&["displayName"]), FieldPath(&["label"])];
const FAMILY_PATHS: &[FieldPath] = &[FieldPath(&["modelFamily"]), FieldPath(&["family"])];
const REMAINING_PATHS: &[FieldPath] = &[
    FieldPath(&["quotaInfo", "remainingFraction"]),
    FieldPath(&["remainingFraction"]),
];
const RESET_PATHS: &[FieldPath] = &[FieldPath(&["quotaInfo", "resetTime"]), FieldPath(&["resetTime"])];

/// Display-ready quota state of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelQuota {
    pub model_id: String,
    pub label: Option<String>,
    pub family: Option<String>,
    /// Remaining quota in percent, clamped to 0..=100
    pub remaining_pct: Option<f64>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl ModelQuota {
    pub fn from_descriptor(model_id: &str, descriptor: &Value) -> Self {
        let text = |paths: &[FieldPath]| {
            first_present(Some(descriptor), paths)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let remaining_pct = first_present(Some(descriptor), REMAINING_PATHS)
            .and_then(as_fraction)
            .map(|fraction| (fraction * 100.0).clamp(0.0, 100.0));

        let reset_at = first_present(Some(descriptor), RESET_PATHS)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            model_id: model_id.to_string(),
            label: text(LABEL_PATHS),
            family: text(FAMILY_PATHS),
            remaining_pct,
            reset_at,
        }
    }

    /// Milliseconds until reset relative to `now`; negative once passed
    pub fn millis_until_reset(&self, now: DateTime<Utc>) -> Option<i64> {
        self.reset_at.map(|reset| (reset - now).num_milliseconds())
    }

    /// Label for display, falling back to the model id
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.model_id)
    }
}

fn as_fraction(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// One row per model, sorted by model id
pub fn quota_rows(models: &ModelsInfo) -> Vec<ModelQuota> {
    let mut rows: Vec<ModelQuota> = models
        .models
        .iter()
        .map(|(id, descriptor)| ModelQuota::from_descriptor(id, descriptor))
        .collect();
    rows.sort_by(|a, b| a.model_id.cmp(&b.model_id));
    rows
}
