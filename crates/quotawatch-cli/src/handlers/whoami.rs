//! Whoami command handler

use super::CommandContext;
use crate::error::Result;
use crate::output::OutputWriter;
use quotawatch_core::api;

/// Handle the whoami command
pub async fn handle_whoami(ctx: &CommandContext, output: &mut OutputWriter) -> Result<()> {
    let settings = ctx.settings.load_settings();

    let spinner = output.spinner("Looking up identity...");
    let result = api::fetch_user_info(&ctx.client, &settings, &ctx.token).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    output.identity(&result?)
}
