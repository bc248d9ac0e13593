//! Host failover behaviour against mock Cloud Code hosts

use quotawatch_core::http::{FailureKind, HostList, RequestDescriptor};
use quotawatch_core::{Error, HeaderPolicy, HeaderSet, HostMode, HttpClient, Settings};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PATH: &str = "/v1internal:loadCodeAssist";

fn settings_for(primary: &MockServer, daily: &MockServer) -> Settings {
    Settings {
        primary_host: primary.uri(),
        daily_host: daily.uri(),
        host_mode: HostMode::Auto,
        ..Settings::default()
    }
}

fn client() -> HttpClient {
    HttpClient::with_default_config().expect("client")
}

/// Captures WARN and above for the current thread
#[derive(Clone, Default)]
struct WarnLog(Arc<Mutex<Vec<u8>>>);

impl Write for WarnLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl WarnLog {
    fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let log = Self::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        (log, tracing::subscriber::set_default(subscriber))
    }

    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// A local address that refuses connections
fn refused_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn success_on_first_host_skips_the_rest() {
    let primary = MockServer::start().await;
    let daily = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&daily)
        .await;

    let outcome = client()
        .post(&settings_for(&primary, &daily), PATH, "tok", None)
        .await
        .expect("success");

    assert_eq!(outcome.host, primary.uri());
    assert_eq!(outcome.json, Some(json!({"ok": true})));
}

#[tokio::test]
async fn server_error_fails_over_to_second_host() {
    let primary = MockServer::start().await;
    let daily = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .and(path(PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "daily"})))
        .expect(1)
        .mount(&daily)
        .await;

    let outcome = client()
        .post(&settings_for(&primary, &daily), PATH, "tok", None)
        .await
        .expect("failover success");

    assert_eq!(outcome.host, daily.uri());
    assert_eq!(outcome.json, Some(json!({"from": "daily"})));
}

#[tokio::test]
async fn client_error_stops_without_touching_second_host() {
    let primary = MockServer::start().await;
    let daily = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}
        })))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&daily)
        .await;

    let err = client()
        .post(&settings_for(&primary, &daily), PATH, "tok", None)
        .await
        .unwrap_err();

    let failure = err.as_request_failure().expect("request failure");
    assert_eq!(failure.kind, FailureKind::ClientError);
    assert_eq!(failure.status_code, Some(401));
    assert_eq!(failure.message, "Request had invalid authentication credentials.");
    assert_eq!(failure.host, primary.uri());
    assert_eq!(err.to_string(), "Request had invalid authentication credentials.");
    assert!(failure.body.as_ref().and_then(|b| b.as_json()).is_some());
}

#[tokio::test]
async fn network_failure_fails_over() {
    let daily = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&daily)
        .await;

    let settings = Settings {
        primary_host: refused_host(),
        daily_host: daily.uri(),
        ..Settings::default()
    };

    let outcome = client().post(&settings, PATH, "tok", None).await.expect("success");
    assert_eq!(outcome.host, daily.uri());
}

#[tokio::test]
async fn timeouts_on_every_host_surface_the_last_failure() {
    let primary = MockServer::start().await;
    let daily = MockServer::start().await;

    for server in [&primary, &daily] {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .expect(1)
            .mount(server)
            .await;
    }

    let settings = Settings {
        request_timeout_ms: 150,
        ..settings_for(&primary, &daily)
    };

    let err = client().post(&settings, PATH, "tok", None).await.unwrap_err();
    let failure = err.as_request_failure().expect("request failure");
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.host, daily.uri());
    assert_eq!(failure.status_code, None);
}

#[tokio::test]
async fn exhausted_hosts_surface_last_server_error_verbatim() {
    let primary = MockServer::start().await;
    let daily = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("primary broke"))
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"error": {"status": "BAD_GATEWAY"}})))
        .mount(&daily)
        .await;

    let err = client()
        .post(&settings_for(&primary, &daily), PATH, "tok", None)
        .await
        .unwrap_err();

    let failure = err.as_request_failure().expect("request failure");
    assert_eq!(failure.status_code, Some(502));
    assert_eq!(failure.message, "BAD_GATEWAY");
    assert_eq!(failure.host, daily.uri());
}

#[tokio::test]
async fn single_host_modes_try_only_their_host() {
    let primary = MockServer::start().await;
    let daily = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&daily)
        .await;

    let settings = Settings {
        host_mode: HostMode::Primary,
        ..settings_for(&primary, &daily)
    };
    let err = client().post(&settings, PATH, "tok", None).await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.to_string(), "HTTP 503");
}

#[tokio::test]
async fn malformed_success_body_is_absent_not_an_error() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&primary)
        .await;

    let hosts = HostList::new(vec![primary.uri()]).unwrap();
    let request = RequestDescriptor::new(
        PATH,
        HeaderSet::cloud_code("tok", HeaderPolicy::default()),
        None,
        Duration::from_secs(12),
    );
    let outcome = client().post_to_hosts(&hosts, &request).await.expect("success");
    assert_eq!(outcome.json, None);
    assert_eq!(outcome.host, primary.uri());
}

#[tokio::test]
async fn absent_body_is_sent_as_empty_object() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_json(json!({})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&primary)
        .await;

    let settings = Settings {
        primary_host: primary.uri(),
        host_mode: HostMode::Primary,
        ..Settings::default()
    };
    let outcome = client().post(&settings, PATH, "tok", None).await.expect("success");
    assert_eq!(outcome.json, None);
}

#[tokio::test]
async fn invalid_token_is_rejected_before_any_request() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&primary)
        .await;

    let settings = Settings {
        primary_host: primary.uri(),
        host_mode: HostMode::Primary,
        ..Settings::default()
    };
    let err = client().post(&settings, PATH, "bad\r\ntoken", None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[tokio::test]
async fn malformed_daily_host_does_not_block_primary() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&primary)
        .await;

    let settings = Settings {
        primary_host: primary.uri(),
        daily_host: "::not-a-url::".to_string(),
        host_mode: HostMode::Auto,
        ..Settings::default()
    };
    let outcome = client().post(&settings, PATH, "tok", None).await.expect("success");
    assert_eq!(outcome.host, primary.uri());
}

#[tokio::test]
async fn malformed_primary_host_fails_over_to_daily() {
    let daily = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "daily"})))
        .expect(1)
        .mount(&daily)
        .await;

    let settings = Settings {
        primary_host: "::not-a-url::".to_string(),
        daily_host: daily.uri(),
        host_mode: HostMode::Auto,
        ..Settings::default()
    };
    let outcome = client().post(&settings, PATH, "tok", None).await.expect("success");
    assert_eq!(outcome.host, daily.uri());
}

#[tokio::test]
async fn only_failover_attempts_are_logged_as_warnings() {
    let (log, _guard) = WarnLog::install();

    let primary = MockServer::start().await;
    let daily = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&daily)
        .await;

    client()
        .post(&settings_for(&primary, &daily), PATH, "tok", None)
        .await
        .expect("failover success");
    assert!(log.contents().contains("trying next host"), "{}", log.contents());

    let rejecting = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": {"message": "denied"}})))
        .mount(&rejecting)
        .await;
    let before = log.contents().len();

    let err = client()
        .post(&settings_for(&rejecting, &daily), PATH, "tok", None)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(log.contents()[before..].trim(), "");
}
