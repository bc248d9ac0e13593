//! Models command handler

use super::CommandContext;
use crate::cli::ModelsArgs;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, QuotaReport};
use chrono::Utc;
use quotawatch_core::api;
use tracing::instrument;

/// Handle the models command
#[instrument(skip_all, fields(project = args.project.as_deref().unwrap_or("")))]
pub async fn handle_models(args: ModelsArgs, ctx: &CommandContext, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("models_lookup", args.project.as_deref().unwrap_or("no project"));
    let settings = ctx.settings.load_settings();

    let spinner = output.spinner("Fetching available models...");
    let result = api::fetch_available_models(&ctx.client, &settings, &ctx.token, args.project.as_deref()).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = QuotaReport::new(result?, ctx.include_raw);
    output.quotas(&report, Utc::now())
}
