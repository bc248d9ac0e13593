//! Command handlers for CLI subcommands
//!
//! Each lookup command reads a fresh settings snapshot from the provider,
//! calls one or more core adapters and hands the result to the output
//! writer. Retry scheduling belongs to `watch`; the adapters themselves
//! fail over between hosts but never retry.

mod completions;
mod config;
mod models;
mod status;
mod tier;
mod utils;
mod watch;
mod whoami;

pub use completions::handle_completions;
pub use config::handle_config;
pub use models::handle_models;
pub use status::{collect_status, handle_status};
pub use tier::handle_tier;
pub use utils::resolve_token;
pub use watch::handle_watch;
pub use whoami::handle_whoami;

use crate::error::Result;
use quotawatch_core::{HttpClient, HttpClientConfig, SettingsProvider};

/// Everything a lookup command needs besides its own arguments
pub struct CommandContext {
    pub client: HttpClient,
    pub settings: Box<dyn SettingsProvider>,
    pub token: String,
    /// Print redacted raw response bodies
    pub include_raw: bool,
}

impl CommandContext {
    pub fn new(
        client_config: HttpClientConfig,
        settings: Box<dyn SettingsProvider>,
        token: String,
        include_raw: bool,
    ) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(client_config)?,
            settings,
            token,
            include_raw,
        })
    }
}
