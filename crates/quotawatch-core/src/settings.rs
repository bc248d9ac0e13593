//! Monitor settings and the settings-provider seam
//!
//! Settings are a plain snapshot. The request layer never reads ambient
//! state: callers obtain a [`Settings`] value from a [`SettingsProvider`]
//! once per call and pass it in explicitly.

use crate::http::hosts::{DAILY_HOST, PRIMARY_HOST};
use crate::api::userinfo::USERINFO_URL;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Project id sent when no duet project is configured
pub const DEFAULT_DUET_PROJECT: &str = "rising-fact-p41fc";

/// Scopes requested by the (external) OAuth flow
pub const DEFAULT_SCOPES: &str = "openid email profile https://www.googleapis.com/auth/cloud-platform";

/// Per-attempt request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 12_000;

/// Poll interval used by the watch loop
pub const DEFAULT_REFRESH_INTERVAL_SEC: u64 = 30;

/// Which Cloud Code hosts to try, and in what order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMode {
    /// Primary host only
    Primary,
    /// Daily host only
    Daily,
    /// Primary first, then daily. Unrecognized values land here.
    #[default]
    #[serde(other)]
    Auto,
}

impl HostMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostMode::Primary => "primary",
            HostMode::Daily => "daily",
            HostMode::Auto => "auto",
        }
    }
}

impl fmt::Display for HostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "primary" => HostMode::Primary,
            "daily" => HostMode::Daily,
            _ => HostMode::Auto,
        })
    }
}

/// Monitor settings, persisted with camelCase key names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// OAuth client id (consumed by the external credential supplier)
    pub client_id: String,
    /// OAuth scopes (consumed by the external credential supplier)
    pub scopes: String,
    /// Cloud project sent as `metadata.duetProject` in tier lookups
    pub duet_project: String,
    /// Quota project, kept for the credential supplier
    pub quota_project: String,
    /// Host selection mode
    pub host_mode: HostMode,
    /// Seconds between polls in watch mode
    pub refresh_interval_sec: u64,
    /// Base URL of the primary Cloud Code host
    pub primary_host: String,
    /// Base URL of the daily Cloud Code host
    pub daily_host: String,
    /// OpenID Connect userinfo endpoint
    pub userinfo_url: String,
    /// Per-attempt timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Whether the custom user agent may be sent
    pub send_user_agent: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            scopes: DEFAULT_SCOPES.to_string(),
            duet_project: DEFAULT_DUET_PROJECT.to_string(),
            quota_project: String::new(),
            host_mode: HostMode::Auto,
            refresh_interval_sec: DEFAULT_REFRESH_INTERVAL_SEC,
            primary_host: PRIMARY_HOST.to_string(),
            daily_host: DAILY_HOST.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            send_user_agent: true,
        }
    }
}

impl Settings {
    /// Duet project to send, with the fixed fallback for an empty value
    pub fn effective_duet_project(&self) -> &str {
        if self.duet_project.is_empty() {
            DEFAULT_DUET_PROJECT
        } else {
            &self.duet_project
        }
    }

    pub fn request_timeout(&self) -> Duration {
        if self.request_timeout_ms == 0 {
            Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)
        } else {
            Duration::from_millis(self.request_timeout_ms)
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_sec.max(1))
    }
}

/// Supplies the current settings snapshot.
///
/// Implementations must not fail: an unreadable store yields defaults.
pub trait SettingsProvider: Send + Sync {
    fn load_settings(&self) -> Settings;
}

impl SettingsProvider for Settings {
    fn load_settings(&self) -> Settings {
        self.clone()
    }
}
