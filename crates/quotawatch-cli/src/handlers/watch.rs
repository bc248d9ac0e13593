//! Watch command handler

use super::{collect_status, CommandContext};
use crate::cli::WatchArgs;
use crate::countdown::format_clock;
use crate::error::Result;
use crate::output::OutputWriter;
use chrono::{Local, Utc};
use std::time::Duration;
use tracing::{debug, info};

/// Handle the watch command.
///
/// Settings are re-read before every poll so edits to the config file take
/// effect without a restart. A failed poll is printed and polling goes on.
pub async fn handle_watch(args: WatchArgs, ctx: &CommandContext, output: &mut OutputWriter) -> Result<()> {
    let mut polls: u32 = 0;

    loop {
        let settings = ctx.settings.load_settings();
        let interval = poll_interval(args.interval, settings.refresh_interval());
        debug!(poll = polls + 1, interval_secs = interval.as_secs(), host_mode = %settings.host_mode, "Polling");

        let report = collect_status(ctx, &settings).await;
        polls += 1;

        let last = args.count.is_some_and(|count| polls >= count);
        if output.is_human() {
            let next = if last {
                format_clock(None)
            } else {
                format_clock(i64::try_from(interval.as_millis()).ok())
            };
            output.section(&format!("{} · next refresh in {}", Local::now().format("%H:%M:%S"), next))?;
        }
        output.status(&report, Utc::now())?;

        if last {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!(polls, "Watch interrupted");
                break;
            }
        }
    }

    Ok(())
}

/// Interval from the flag when positive, else the configured refresh interval
fn poll_interval(flag_secs: Option<u64>, configured: Duration) -> Duration {
    flag_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(configured)
}
