//! OpenID Connect userinfo lookup
//!
//! A single well-known host with only the bearer header; no failover and
//! no normalization, since the claim set is standardized.

use crate::http::error::{parse_json_body, RequestFailure};
use crate::http::headers::HeaderSet;
use crate::http::timeout::with_timeout;
use crate::http::HttpClient;
use crate::settings::Settings;
use crate::{Error, Result};
use serde_json::Value;

pub const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Error message preference: `error_description`, a string `error`,
/// `error.message`, `error.status`, then `HTTP {status}`.
pub fn identity_error_message(json: Option<&Value>, status: u16) -> String {
    let non_empty = |v: Option<&Value>| v.and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string);

    json.and_then(|json| {
        non_empty(json.get("error_description"))
            .or_else(|| non_empty(json.get("error")))
            .or_else(|| {
                let error = json.get("error")?;
                non_empty(error.get("message")).or_else(|| non_empty(error.get("status")))
            })
    })
    .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Fetch the identity claims for `access_token`. An unparsable success body
/// yields `Value::Null`.
pub async fn fetch_user_info(client: &HttpClient, settings: &Settings, access_token: &str) -> Result<Value> {
    let url = settings.userinfo_url.as_str();
    let headers = HeaderSet::bearer(access_token).to_header_map()?;
    let timeout = settings.request_timeout();

    let exchange = async {
        let response = client
            .reqwest()
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::Request(RequestFailure::network(url, &e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(RequestFailure::network(url, &e)))?;
        Ok::<_, Error>((status, parse_json_body(&text)))
    };

    let (status, json) = with_timeout(exchange, timeout)
        .await
        .map_err(|_| Error::Request(RequestFailure::timeout(url, timeout)))??;

    if !status.is_success() {
        return Err(Error::Identity {
            message: identity_error_message(json.as_ref(), status.as_u16()),
            status_code: Some(status.as_u16()),
        });
    }

    Ok(json.unwrap_or(Value::Null))
}
