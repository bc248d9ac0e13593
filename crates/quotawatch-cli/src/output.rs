//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), the report shapes the
//! commands print, and progress spinners for in-flight requests.

use crate::cli::OutputFormat;
use crate::countdown::{format_countdown, format_local_datetime, tier_badge};
use crate::error::Result;
use crate::logging::redaction;
use chrono::{DateTime, Utc};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use quotawatch_core::{quota_rows, ModelQuota, ModelsInfo, TierInfo};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::time::Duration;
use tracing::trace;

/// Models lookup as printed: one row per model plus the serving host
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaReport {
    pub host: String,
    pub models: Vec<ModelQuota>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
}

impl QuotaReport {
    pub fn new(info: ModelsInfo, include_raw: bool) -> Self {
        let models = quota_rows(&info);
        Self {
            host: info.host,
            models,
            raw_response: prepare_raw(info.raw_response, include_raw),
        }
    }
}

/// A lookup that failed inside a combined report
#[derive(Debug, Clone, Serialize)]
pub struct SectionError {
    pub section: &'static str,
    pub message: String,
}

/// Combined tier, quota and identity report
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub tier: Option<TierInfo>,
    pub quotas: Option<QuotaReport>,
    pub identity: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SectionError>,
}

/// Drop the raw body unless asked for, and mask credentials when kept
pub fn prepare_raw(raw: Option<Value>, include: bool) -> Option<Value> {
    if !include {
        return None;
    }
    raw.map(|mut value| {
        redaction::redact_json_value(&mut value);
        value
    })
}

/// Trait for formatting serializable values in the machine formats
pub trait OutputFormatter {
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human output has dedicated renderers; pretty JSON is the fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            writer,
        }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write a `label: value` line
    pub fn field(&mut self, label: &str, value: &str) -> Result<()> {
        let label = format!("{:<12}", format!("{}:", label));
        if self.use_color {
            self.writeln(&format!("  {} {}", label.bold(), value))
        } else {
            self.writeln(&format!("  {} {}", label, value))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");
        self.writeln(formatted.trim_end())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        let width = |s: &str| s.chars().count();
        let mut widths = headers.iter().map(|h| width(h)).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(width(cell));
                }
            }
        }

        let pad = |cell: &str, w: usize| format!("{}{}", cell, " ".repeat(w.saturating_sub(width(cell))));

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| pad(h, widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");
        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| pad(cell, widths.get(i).copied().unwrap_or(0)))
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }

    /// Create a spinner for an in-flight request
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Tier lookup result
    pub fn tier(&mut self, info: &TierInfo) -> Result<()> {
        if !self.is_human() {
            return self.data(info);
        }
        self.render_tier(info)
    }

    fn render_tier(&mut self, info: &TierInfo) -> Result<()> {
        let badge = tier_badge(info.tier);
        let badge = if self.use_color {
            match info.tier {
                quotawatch_core::Tier::Ultra => badge.magenta().bold().to_string(),
                quotawatch_core::Tier::Pro => badge.cyan().bold().to_string(),
                quotawatch_core::Tier::Free => badge.green().bold().to_string(),
                quotawatch_core::Tier::Unknown => badge.dimmed().to_string(),
            }
        } else {
            badge
        };
        self.field("Tier", &badge)?;
        self.field("Paid tier", info.paid_tier_id.as_deref().unwrap_or("—"))?;
        self.field("Project", info.project_id.as_deref().unwrap_or("—"))?;
        self.field("Host", &info.host)?;
        self.raw(info.raw_response.as_ref())
    }

    /// Models lookup result with quota countdowns relative to `now`
    pub fn quotas(&mut self, report: &QuotaReport, now: DateTime<Utc>) -> Result<()> {
        if !self.is_human() {
            return self.data(report);
        }
        self.render_quotas(report, now)
    }

    fn render_quotas(&mut self, report: &QuotaReport, now: DateTime<Utc>) -> Result<()> {
        if report.models.is_empty() {
            self.warning(&format!("No models reported by {}", report.host))?;
            return self.raw(report.raw_response.as_ref());
        }

        let rows = report
            .models
            .iter()
            .map(|row| {
                vec![
                    row.display_label().to_string(),
                    row.family.clone().unwrap_or_else(|| "—".to_string()),
                    row.remaining_pct
                        .map(|pct| format!("{:.0}%", pct))
                        .unwrap_or_else(|| "—".to_string()),
                    format_countdown(row.millis_until_reset(now)),
                    format_local_datetime(row.reset_at),
                ]
            })
            .collect();

        self.table(&["Model", "Family", "Remaining", "Resets in", "Resets at"], rows)?;
        self.field("Host", &report.host)?;
        self.raw(report.raw_response.as_ref())
    }

    /// Userinfo claims
    pub fn identity(&mut self, claims: &Value) -> Result<()> {
        if !self.is_human() {
            return self.data(claims);
        }
        self.render_identity(claims)
    }

    fn render_identity(&mut self, claims: &Value) -> Result<()> {
        let claim = |key: &str| claims.get(key).and_then(Value::as_str).unwrap_or("—").to_string();
        self.field("Email", &claim("email"))?;
        self.field("Name", &claim("name"))?;
        self.field("Subject", &claim("sub"))
    }

    /// Combined status report
    pub fn status(&mut self, report: &StatusReport, now: DateTime<Utc>) -> Result<()> {
        if !self.is_human() {
            return self.data(report);
        }

        if let Some(identity) = &report.identity {
            self.section("Account")?;
            self.render_identity(identity)?;
        }
        if let Some(tier) = &report.tier {
            self.section("Subscription")?;
            self.render_tier(tier)?;
        }
        if let Some(quotas) = &report.quotas {
            self.section("Model quotas")?;
            self.render_quotas(quotas, now)?;
        }
        for failure in &report.errors {
            self.error(&format!("{} lookup failed: {}", failure.section, failure.message))?;
        }
        Ok(())
    }

    fn raw(&mut self, raw: Option<&Value>) -> Result<()> {
        match raw {
            Some(raw) => {
                self.writeln("  Raw response:")?;
                let pretty = serde_json::to_string_pretty(raw)?;
                for line in pretty.lines() {
                    self.writeln(&format!("    {}", line))?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests;
