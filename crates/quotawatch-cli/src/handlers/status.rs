//! Status command handler

use super::CommandContext;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{prepare_raw, OutputWriter, QuotaReport, SectionError, StatusReport};
use chrono::Utc;
use quotawatch_core::{api, Settings};

/// Run the three lookups against one settings snapshot.
///
/// The tier lookup runs first because its resolved project scopes the
/// models lookup; models and identity then run concurrently. A failed
/// lookup is recorded in the report and does not stop the others.
pub async fn collect_status(ctx: &CommandContext, settings: &Settings) -> StatusReport {
    let _timer = Timer::new("status_lookup");
    let mut report = StatusReport::default();

    let project = match api::fetch_subscription_tier(&ctx.client, settings, &ctx.token, None).await {
        Ok(mut info) => {
            info.raw_response = prepare_raw(info.raw_response.take(), ctx.include_raw);
            let project = info.project_id.clone();
            report.tier = Some(info);
            project
        }
        Err(e) => {
            report.errors.push(SectionError {
                section: "tier",
                message: e.to_string(),
            });
            None
        }
    };

    let (models, identity) = tokio::join!(
        api::fetch_available_models(&ctx.client, settings, &ctx.token, project.as_deref()),
        api::fetch_user_info(&ctx.client, settings, &ctx.token),
    );

    match models {
        Ok(info) => report.quotas = Some(QuotaReport::new(info, ctx.include_raw)),
        Err(e) => report.errors.push(SectionError {
            section: "models",
            message: e.to_string(),
        }),
    }
    match identity {
        Ok(claims) => report.identity = Some(claims),
        Err(e) => report.errors.push(SectionError {
            section: "identity",
            message: e.to_string(),
        }),
    }

    report
}

/// Handle the status command
pub async fn handle_status(ctx: &CommandContext, output: &mut OutputWriter) -> Result<()> {
    let settings = ctx.settings.load_settings();

    let spinner = output.spinner("Checking tier, quotas and identity...");
    let report = collect_status(ctx, &settings).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    output.status(&report, Utc::now())?;

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(Error::other(format!("{} of 3 lookups failed", report.errors.len())))
    }
}
