//! Resilient request client
//!
//! Posts a JSON body to each candidate host in priority order. Network
//! failures, timeouts and 5xx responses fail over to the next host; any
//! other non-success status stops the loop, since it would reproduce on
//! every host.

use crate::http::error::{parse_json_body, RequestFailure};
use crate::http::headers::{HeaderPolicy, HeaderSet};
use crate::http::hosts::{endpoint_url, select_hosts, HostList};
use crate::http::timeout::with_timeout;
use crate::settings::Settings;
use crate::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Configuration for the underlying HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Time allowed to establish a connection, within the attempt timeout
    pub connect_timeout: Option<Duration>,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            validate_tls: true,
        }
    }
}

/// One POST, fixed for the duration of the call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub path: String,
    pub headers: HeaderSet,
    pub body: Value,
    pub timeout: Duration,
}

impl RequestDescriptor {
    /// Descriptor for `path`; an absent body is sent as `{}`
    pub fn new(path: &str, headers: HeaderSet, body: Option<Value>, timeout: Duration) -> Self {
        Self {
            path: path.to_string(),
            headers,
            body: body.unwrap_or_else(|| Value::Object(Default::default())),
            timeout,
        }
    }
}

/// Successful outcome: parsed body (absent when empty or malformed) and the
/// host that answered
#[derive(Debug, Clone, PartialEq)]
pub struct PostSuccess {
    pub json: Option<Value>,
    pub host: String,
}

/// HTTP client shared by every endpoint adapter
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Create a new client
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder().danger_accept_invalid_certs(!config.validate_tls);
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder.build().map_err(|e| Error::HttpClient {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { client })
    }

    /// Create with default configuration
    pub fn with_default_config() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    pub(crate) fn reqwest(&self) -> &ReqwestClient {
        &self.client
    }

    /// POST `body` to `path` on the hosts selected by `settings`
    pub async fn post(
        &self,
        settings: &Settings,
        path: &str,
        access_token: &str,
        body: Option<Value>,
    ) -> Result<PostSuccess> {
        let hosts = select_hosts(settings);
        let policy = HeaderPolicy {
            allow_custom_user_agent: settings.send_user_agent,
        };
        let headers = HeaderSet::cloud_code(access_token, policy);
        let request = RequestDescriptor::new(path, headers, body, settings.request_timeout());
        self.post_to_hosts(&hosts, &request).await
    }

    /// Run the failover loop for an explicit host list.
    ///
    /// A host whose endpoint URL does not parse counts as a failed attempt
    /// and the loop moves on; it only surfaces when no later host answers.
    pub async fn post_to_hosts(&self, hosts: &HostList, request: &RequestDescriptor) -> Result<PostSuccess> {
        let header_map = request.headers.to_header_map()?;
        let payload = serde_json::to_vec(&request.body)?;

        let mut last_error: Option<Error> = None;

        for (idx, host) in hosts.iter().enumerate() {
            let url = match endpoint_url(host, &request.path) {
                Ok(url) => url,
                Err(e) => {
                    warn!(host, path = %request.path, error = %e, "Skipping host with invalid endpoint URL");
                    last_error = Some(e);
                    continue;
                }
            };
            debug!(host, path = %request.path, attempt = idx + 1, "Posting to Cloud Code host");

            match self
                .attempt(host, url, &header_map, &payload, request.timeout)
                .await
            {
                Ok(success) => {
                    if idx > 0 {
                        info!(host, path = %request.path, attempt = idx + 1, "Host failover succeeded");
                    }
                    return Ok(success);
                }
                Err(failure) => {
                    let failover = failure.should_failover();
                    if failover {
                        warn!(
                            host,
                            path = %request.path,
                            status = ?failure.status_code,
                            kind = ?failure.kind,
                            "Cloud Code attempt failed, trying next host"
                        );
                    } else {
                        debug!(
                            host,
                            path = %request.path,
                            status = ?failure.status_code,
                            "Cloud Code attempt rejected, not failing over"
                        );
                    }
                    last_error = Some(Error::Request(failure));
                    if !failover {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Request(RequestFailure::exhausted())))
    }

    async fn attempt(
        &self,
        host: &str,
        url: Url,
        headers: &HeaderMap,
        payload: &[u8],
        timeout: Duration,
    ) -> std::result::Result<PostSuccess, RequestFailure> {
        let exchange = async {
            let response = self
                .client
                .post(url)
                .headers(headers.clone())
                .body(payload.to_vec())
                .send()
                .await
                .map_err(|e| RequestFailure::network(host, &e))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| RequestFailure::network(host, &e))?;

            if status.is_success() {
                Ok(PostSuccess {
                    json: parse_json_body(&text),
                    host: host.to_string(),
                })
            } else {
                Err(RequestFailure::from_response(host, status.as_u16(), &text))
            }
        };

        match with_timeout(exchange, timeout).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RequestFailure::timeout(host, timeout)),
        }
    }
}
