//! Host selection for Cloud Code requests

use crate::settings::{HostMode, Settings};
use crate::{Error, Result};
use url::Url;

pub const PRIMARY_HOST: &str = "https://cloudcode-pa.googleapis.com";
pub const DAILY_HOST: &str = "https://daily-cloudcode-pa.googleapis.com";

/// Ordered, non-empty list of base URLs. Order is priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostList(Vec<String>);

impl HostList {
    /// Build from explicit hosts; an empty list is a configuration error
    pub fn new(hosts: Vec<String>) -> Result<Self> {
        if hosts.is_empty() {
            return Err(Error::Configuration {
                message: "Host list must not be empty".to_string(),
                source: None,
            });
        }
        Ok(Self(hosts))
    }

    pub fn hosts(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|h| h.as_str())
    }
}

/// Hosts to try for the given settings snapshot.
///
/// Pure: nothing is cached, so a changed mode applies on the next call.
pub fn select_hosts(settings: &Settings) -> HostList {
    let hosts = match settings.host_mode {
        HostMode::Primary => vec![settings.primary_host.clone()],
        HostMode::Daily => vec![settings.daily_host.clone()],
        HostMode::Auto => vec![settings.primary_host.clone(), settings.daily_host.clone()],
    };
    HostList(hosts)
}

/// Join a base host and an endpoint path such as `/v1internal:loadCodeAssist`
pub fn endpoint_url(host: &str, path: &str) -> Result<Url> {
    let joined = format!("{}{}", host.trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| Error::Configuration {
        message: format!("Invalid endpoint URL: {}", joined),
        source: Some(anyhow::Error::new(e)),
    })
}
