//! Available-models lookup (`fetchAvailableModels`)

use crate::http::HttpClient;
use crate::settings::Settings;
use crate::types::ModelsInfo;
use crate::Result;
use serde_json::{Map, Value};

pub const FETCH_AVAILABLE_MODELS_PATH: &str = "/v1internal:fetchAvailableModels";

/// Request body; `project` is included only when given and non-empty
pub fn models_request_body(project: Option<&str>) -> Value {
    let mut body = Map::new();
    if let Some(project) = project.filter(|p| !p.is_empty()) {
        body.insert("project".to_string(), Value::String(project.to_string()));
    }
    Value::Object(body)
}

/// Normalize a `fetchAvailableModels` response. A missing or non-object
/// `models` field yields an empty mapping.
pub fn normalize_models(json: Option<Value>, host: String) -> ModelsInfo {
    let models = json
        .as_ref()
        .and_then(|v| v.get("models"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    ModelsInfo {
        models,
        raw_response: json,
        host,
    }
}

/// Fetch the models available to the account, with their quota descriptors
pub async fn fetch_available_models(
    client: &HttpClient,
    settings: &Settings,
    access_token: &str,
    project: Option<&str>,
) -> Result<ModelsInfo> {
    let body = models_request_body(project);
    let outcome = client
        .post(settings, FETCH_AVAILABLE_MODELS_PATH, access_token, Some(body))
        .await?;

    let info = normalize_models(outcome.json, outcome.host);
    tracing::debug!(models = info.models.len(), host = %info.host, "Models lookup normalized");
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_includes_project_only_when_given() {
        assert_eq!(models_request_body(None), json!({}));
        assert_eq!(models_request_body(Some("")), json!({}));
        assert_eq!(models_request_body(Some("p-1")), json!({"project": "p-1"}));
    }

    #[test]
    fn test_extracts_models_mapping() {
        let raw = json!({"models": {"gemini-2.5-pro": {"displayName": "Gemini 2.5 Pro"}}});
        let info = normalize_models(Some(raw.clone()), "h".into());
        assert_eq!(info.models.len(), 1);
        assert!(info.models.contains_key("gemini-2.5-pro"));
        assert_eq!(info.raw_response, Some(raw));
    }

    #[test]
    fn test_missing_or_malformed_models_is_empty() {
        assert!(normalize_models(None, "h".into()).is_empty());
        assert!(normalize_models(Some(json!({"other": 1})), "h".into()).is_empty());
        assert!(normalize_models(Some(json!({"models": ["a", "b"]})), "h".into()).is_empty());
        assert!(normalize_models(Some(json!({"models": null})), "h".into()).is_empty());
    }
}
