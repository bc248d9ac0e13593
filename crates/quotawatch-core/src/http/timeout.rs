//! Per-attempt timeout bound
//!
//! Each attempt owns its own deadline. Expiry drops the in-flight future,
//! which aborts that request only; sibling calls are unaffected.

use std::future::Future;
use std::time::Duration;

/// Run `future` to completion or until `timeout` elapses
pub async fn with_timeout<F, T>(future: F, timeout: Duration) -> Result<T, tokio::time::error::Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(timeout, future).await
}
