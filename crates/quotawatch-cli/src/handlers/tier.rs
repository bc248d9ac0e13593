//! Tier command handler

use super::CommandContext;
use crate::cli::TierArgs;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{prepare_raw, OutputWriter};
use quotawatch_core::api;
use tracing::instrument;

/// Handle the tier command
#[instrument(skip_all)]
pub async fn handle_tier(args: TierArgs, ctx: &CommandContext, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("tier_lookup");
    let settings = ctx.settings.load_settings();

    let spinner = output.spinner("Looking up subscription tier...");
    let result = api::fetch_subscription_tier(&ctx.client, &settings, &ctx.token, args.duet_project.as_deref()).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let mut info = result?;
    info.raw_response = prepare_raw(info.raw_response.take(), ctx.include_raw);
    output.tier(&info)
}
