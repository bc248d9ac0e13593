//! Identification headers for Cloud Code requests
//!
//! Every outbound request carries the same fixed header set: bearer token,
//! JSON content type, API client tag, serialized client metadata and, when
//! the environment allows it, a custom user agent.

use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const X_GOOG_API_CLIENT: &str = "X-Goog-Api-Client";
pub const CLIENT_METADATA: &str = "Client-Metadata";
pub const USER_AGENT: &str = "User-Agent";

/// Value of the `X-Goog-Api-Client` header
pub const API_CLIENT_TAG: &str = "google-cloud-sdk vscode_cloudshelleditor/0.1";

/// Custom user agent, sent on a best-effort basis
pub const AG_USER_AGENT: &str = "antigravity/1.16.5";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Fixed client metadata object. Field order is part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub ide_type: String,
    pub platform: String,
    pub plugin_type: String,
}

impl Default for ClientMetadata {
    fn default() -> Self {
        Self {
            ide_type: "IDE_UNSPECIFIED".to_string(),
            platform: "PLATFORM_UNSPECIFIED".to_string(),
            plugin_type: "GEMINI".to_string(),
        }
    }
}

impl ClientMetadata {
    /// Compact JSON form used as the `Client-Metadata` header value
    pub fn to_header_value(&self) -> String {
        serde_json::json!({
            "ideType": self.ide_type,
            "platform": self.platform,
            "pluginType": self.plugin_type,
        })
        .to_string()
    }
}

/// What the execution environment lets us put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPolicy {
    pub allow_custom_user_agent: bool,
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self {
            allow_custom_user_agent: true,
        }
    }
}

/// Header mapping for one request, plus the outcome of the optional user agent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderSet {
    entries: HashMap<String, String>,
    user_agent_applied: bool,
}

impl HeaderSet {
    /// Full Cloud Code header set for `access_token`. Never fails.
    pub fn cloud_code(access_token: &str, policy: HeaderPolicy) -> Self {
        let mut set = Self::bearer(access_token);
        set.insert(CONTENT_TYPE, JSON_CONTENT_TYPE);
        set.insert(X_GOOG_API_CLIENT, API_CLIENT_TAG);
        set.insert(CLIENT_METADATA, &ClientMetadata::default().to_header_value());
        set.user_agent_applied = set.try_apply_user_agent(policy);
        set
    }

    /// Only the bearer header, as the identity endpoint expects
    pub fn bearer(access_token: &str) -> Self {
        let mut set = Self::default();
        set.insert(AUTHORIZATION, &format!("Bearer {}", access_token));
        set
    }

    fn insert(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_string(), value.to_string());
    }

    fn try_apply_user_agent(&mut self, policy: HeaderPolicy) -> bool {
        if !policy.allow_custom_user_agent {
            tracing::debug!("Custom user agent disallowed, omitting");
            return false;
        }
        if HeaderValue::from_str(AG_USER_AGENT).is_err() {
            return false;
        }
        self.insert(USER_AGENT, AG_USER_AGENT);
        true
    }

    /// Look up a header by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn user_agent_applied(&self) -> bool {
        self.user_agent_applied
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode for reqwest. Required headers must encode; the user agent is
    /// dropped silently if it cannot be.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let optional = key.eq_ignore_ascii_case(USER_AGENT);
            let name = match HeaderName::from_bytes(key.as_bytes()) {
                Ok(name) => name,
                Err(_) if optional => continue,
                Err(e) => {
                    return Err(Error::InvalidHeader {
                        name: key.clone(),
                        message: e.to_string(),
                    })
                }
            };
            let mut header_value = match HeaderValue::from_str(value) {
                Ok(v) => v,
                Err(_) if optional => continue,
                Err(e) => {
                    return Err(Error::InvalidHeader {
                        name: key.clone(),
                        message: e.to_string(),
                    })
                }
            };
            if key.eq_ignore_ascii_case(AUTHORIZATION) {
                header_value.set_sensitive(true);
            }
            map.insert(name, header_value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_code_headers() {
        let set = HeaderSet::cloud_code("ya29.token", HeaderPolicy::default());
        assert_eq!(set.get("authorization"), Some("Bearer ya29.token"));
        assert_eq!(set.get(CONTENT_TYPE), Some("application/json"));
        assert_eq!(set.get(X_GOOG_API_CLIENT), Some("google-cloud-sdk vscode_cloudshelleditor/0.1"));
        assert_eq!(
            set.get(CLIENT_METADATA),
            Some(r#"{"ideType":"IDE_UNSPECIFIED","platform":"PLATFORM_UNSPECIFIED","pluginType":"GEMINI"}"#)
        );
        assert_eq!(set.get(USER_AGENT), Some("antigravity/1.16.5"));
        assert!(set.user_agent_applied());
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_user_agent_omitted_when_disallowed() {
        let policy = HeaderPolicy {
            allow_custom_user_agent: false,
        };
        let set = HeaderSet::cloud_code("t", policy);
        assert!(!set.user_agent_applied());
        assert!(set.get(USER_AGENT).is_none());
        assert_eq!(set.len(), 4);
        assert!(set.to_header_map().is_ok());
    }

    #[test]
    fn test_bearer_only() {
        let set = HeaderSet::bearer("abc");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(AUTHORIZATION), Some("Bearer abc"));
        assert!(!set.user_agent_applied());
    }

    #[test]
    fn test_header_map_marks_authorization_sensitive() {
        let map = HeaderSet::cloud_code("secret", HeaderPolicy::default())
            .to_header_map()
            .unwrap();
        let auth = map.get("authorization").unwrap();
        assert!(auth.is_sensitive());
        assert_eq!(auth.to_str().unwrap(), "Bearer secret");
        assert_eq!(map.get("user-agent").unwrap(), "antigravity/1.16.5");
    }

    #[test]
    fn test_unencodable_token_is_an_error_at_send_time() {
        let set = HeaderSet::cloud_code("bad\ntoken", HeaderPolicy::default());
        // Building never fails
        assert_eq!(set.get(AUTHORIZATION), Some("Bearer bad\ntoken"));
        match set.to_header_map() {
            Err(Error::InvalidHeader { name, .. }) => assert_eq!(name, AUTHORIZATION),
            other => panic!("expected InvalidHeader, got {:?}", other),
        }
    }
}
