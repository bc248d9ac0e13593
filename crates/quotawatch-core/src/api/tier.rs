//! Tier and project lookup (`loadCodeAssist`)

use crate::extract::{first_present_string, FieldPath};
use crate::http::headers::ClientMetadata;
use crate::http::HttpClient;
use crate::settings::Settings;
use crate::types::{Tier, TierInfo};
use crate::Result;
use serde::Serialize;
use serde_json::Value;

pub const LOAD_CODE_ASSIST_PATH: &str = "/v1internal:loadCodeAssist";

/// Where the paid-tier identifier may appear, highest precedence first
pub const PAID_TIER_ID_PATHS: &[FieldPath] = &[
    FieldPath(&["paidTier", "id"]),
    FieldPath(&["codeAssistTier", "paidTier", "id"]),
    FieldPath(&["tier", "id"]),
    FieldPath(&["paidTierId"]),
];

/// Where the project id may appear, highest precedence first
pub const PROJECT_ID_PATHS: &[FieldPath] = &[
    FieldPath(&["projectId"]),
    FieldPath(&["duetProjectId"]),
    FieldPath(&["project"]),
    FieldPath(&["metadata", "duetProject"]),
];

#[derive(Debug, Serialize)]
struct LoadCodeAssistRequest<'a> {
    metadata: RequestMetadata<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestMetadata<'a> {
    #[serde(flatten)]
    client: ClientMetadata,
    duet_project: &'a str,
}

/// Request body: the fixed client metadata plus the duet project
pub fn tier_request_body(duet_project: &str) -> Result<Value> {
    let request = LoadCodeAssistRequest {
        metadata: RequestMetadata {
            client: ClientMetadata::default(),
            duet_project,
        },
    };
    Ok(serde_json::to_value(request)?)
}

/// Normalize a `loadCodeAssist` response
pub fn normalize_tier(json: Option<Value>, host: String) -> TierInfo {
    let paid_tier_id = first_present_string(json.as_ref(), PAID_TIER_ID_PATHS);
    let tier = paid_tier_id.as_deref().map(Tier::classify).unwrap_or_default();
    let project_id = first_present_string(json.as_ref(), PROJECT_ID_PATHS);

    TierInfo {
        tier,
        paid_tier_id,
        project_id,
        raw_response: json,
        host,
    }
}

/// Look up the account tier and project.
///
/// `duet_project` overrides the configured project; an absent or empty
/// override uses the settings value (or its fixed fallback).
pub async fn fetch_subscription_tier(
    client: &HttpClient,
    settings: &Settings,
    access_token: &str,
    duet_project: Option<&str>,
) -> Result<TierInfo> {
    let duet_project = duet_project
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| settings.effective_duet_project());
    let body = tier_request_body(duet_project)?;

    let outcome = client
        .post(settings, LOAD_CODE_ASSIST_PATH, access_token, Some(body))
        .await?;

    let info = normalize_tier(outcome.json, outcome.host);
    tracing::debug!(tier = %info.tier, host = %info.host, "Tier lookup normalized");
    Ok(info)
}
