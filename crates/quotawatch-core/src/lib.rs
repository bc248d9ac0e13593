//! Quotawatch Core - resilient request layer for a Cloud Code quota monitor
//!
//! This crate authenticates nothing and renders nothing. It sends requests
//! to the account and quota endpoints, fails over between hosts, and turns
//! loosely specified responses into small stable result types.
//!
//! # Main Components
//!
//! - **Settings**: an explicit settings snapshot and the provider seam
//! - **HTTP layer**: fixed header set, host selection, timeout-bounded failover
//! - **Adapters**: tier/project, available models, user identity
//! - **Quota rows**: display-ready view of model quota descriptors
//!
//! # Example
//!
//! ```no_run
//! use quotawatch_core::{api, HttpClient, Settings, Result};
//!
//! async fn example(token: &str) -> Result<()> {
//!     let client = HttpClient::with_default_config()?;
//!     let settings = Settings::default();
//!     let tier = api::fetch_subscription_tier(&client, &settings, token, None).await?;
//!     let models = api::fetch_available_models(&client, &settings, token, tier.project_id.as_deref()).await?;
//!     println!("{} via {}: {} models", tier.tier, tier.host, models.models.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod extract;
pub mod http;
pub mod quota;
pub mod settings;
pub mod types;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use http::{
    ErrorBody, FailureKind, HeaderPolicy, HeaderSet, HostList, HttpClient, HttpClientConfig,
    PostSuccess, RequestDescriptor, RequestFailure,
};
pub use quota::{quota_rows, ModelQuota};
pub use settings::{HostMode, Settings, SettingsProvider};
pub use types::{ModelsInfo, Tier, TierInfo};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
