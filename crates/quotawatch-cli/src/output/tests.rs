// Rendering tests for the report writers
//
// Output is captured through a shared buffer so the human renderers can be
// checked line by line without a terminal.

use super::*;
use chrono::TimeZone;
use quotawatch_core::Tier;
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let out = OutputWriter::with_writer(format, false, false, Box::new(buffer.clone()));
    (out, buffer)
}

fn tier_info() -> TierInfo {
    TierInfo {
        tier: Tier::Pro,
        paid_tier_id: Some("gemini-code-assist-PRO".to_string()),
        project_id: Some("proj-7".to_string()),
        raw_response: None,
        host: "https://cloudcode-pa.googleapis.com".to_string(),
    }
}

fn models_info() -> ModelsInfo {
    let raw = json!({
        "models": {
            "gemini-2.5-pro": {
                "displayName": "Gemini 2.5 Pro",
                "modelFamily": "gemini",
                "quotaInfo": {"remainingFraction": 0.4, "resetTime": "2030-01-01T02:05:09Z"}
            },
            "claude-sonnet": {"displayName": "Claude Sonnet"}
        },
        "accessToken": "ya29.leaked"
    });
    ModelsInfo {
        models: raw["models"].as_object().cloned().unwrap(),
        raw_response: Some(raw),
        host: "https://daily-cloudcode-pa.googleapis.com".to_string(),
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_prepare_raw_drops_or_redacts() {
    let raw = Some(json!({"access_token": "ya29.secret", "tier": "pro"}));
    assert_eq!(prepare_raw(raw.clone(), false), None);

    let kept = prepare_raw(raw, true).unwrap();
    assert_eq!(kept["access_token"], "***");
    assert_eq!(kept["tier"], "pro");
}

#[test]
fn test_quota_report_rows_and_raw() {
    let report = QuotaReport::new(models_info(), true);
    assert_eq!(report.models.len(), 2);
    assert_eq!(report.models[0].model_id, "claude-sonnet");
    assert_eq!(report.raw_response.as_ref().unwrap()["accessToken"], "***");

    let report = QuotaReport::new(models_info(), false);
    assert!(report.raw_response.is_none());
}

#[test]
fn test_human_tier_rendering() {
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.tier(&tier_info()).unwrap();

    let text = buffer.contents();
    assert!(text.contains("Tier:"));
    assert!(text.contains("PRO"));
    assert!(text.contains("gemini-code-assist-PRO"));
    assert!(text.contains("proj-7"));
    assert!(!text.contains("Raw response"));
}

#[test]
fn test_human_quota_table_has_countdowns() {
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.quotas(&QuotaReport::new(models_info(), false), now()).unwrap();

    let text = buffer.contents();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Model"));
    assert!(lines[2].starts_with("Claude Sonnet"));
    assert!(lines[3].starts_with("Gemini 2.5 Pro"));
    assert!(lines[3].contains("40%"));
    assert!(lines[3].contains("2h 5m 9s"));
    assert!(text.contains("daily-cloudcode-pa"));
}

#[test]
fn test_empty_models_warns() {
    let info = ModelsInfo {
        models: Default::default(),
        raw_response: None,
        host: "https://h".to_string(),
    };
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.quotas(&QuotaReport::new(info, false), now()).unwrap();
    assert_eq!(buffer.contents().trim(), "WARNING: No models reported by https://h");
}

#[test]
fn test_json_status_report() {
    let report = StatusReport {
        tier: Some(tier_info()),
        quotas: None,
        identity: Some(json!({"email": "dev@example.com"})),
        errors: vec![SectionError {
            section: "models",
            message: "HTTP 503".to_string(),
        }],
    };

    let (mut out, buffer) = writer(OutputFormat::Json);
    out.status(&report, now()).unwrap();

    let parsed: Value = serde_json::from_str(&buffer.contents()).unwrap();
    assert_eq!(parsed["tier"]["tier"], "pro");
    assert_eq!(parsed["tier"]["projectId"], "proj-7");
    assert_eq!(parsed["identity"]["email"], "dev@example.com");
    assert_eq!(parsed["errors"][0]["section"], "models");
    assert!(parsed["quotas"].is_null());
}

#[test]
fn test_human_status_lists_failures() {
    let report = StatusReport {
        errors: vec![SectionError {
            section: "tier",
            message: "Request to https://h timed out after 12000ms".to_string(),
        }],
        ..Default::default()
    };
    let (mut out, buffer) = writer(OutputFormat::Human);
    out.status(&report, now()).unwrap();
    assert!(buffer
        .contents()
        .contains("ERROR: tier lookup failed: Request to https://h timed out after 12000ms"));
}

#[test]
fn test_yaml_identity() {
    let (mut out, buffer) = writer(OutputFormat::Yaml);
    out.identity(&json!({"sub": "42"})).unwrap();
    assert_eq!(buffer.contents().trim(), "sub: '42'");
}

#[test]
fn test_messages_suppressed_in_machine_formats() {
    let (mut out, buffer) = writer(OutputFormat::JsonPretty);
    out.info("hello").unwrap();
    out.warning("careful").unwrap();
    out.section("Title").unwrap();
    assert!(buffer.contents().is_empty());
}
