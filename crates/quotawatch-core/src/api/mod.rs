//! Endpoint adapters
//!
//! Each adapter builds a request body, sends it through the request layer and
//! normalizes whatever comes back into a small fixed result type.

pub mod models;
pub mod tier;
pub mod userinfo;

pub use models::{fetch_available_models, normalize_models, FETCH_AVAILABLE_MODELS_PATH};
pub use tier::{fetch_subscription_tier, normalize_tier, LOAD_CODE_ASSIST_PATH};
pub use userinfo::{fetch_user_info, USERINFO_URL};
