use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, warn};

/// Bounded retry with linear backoff, for idempotent writes whose failure
/// must not fail the surrounding job. The delay before attempt n+1 is
/// `base_delay * n`. After `max_attempts` failures the last error is logged
/// and `None` is returned; nothing propagates.
pub async fn with_retry<T, F, Fut>(
    label: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 1..=max_attempts.max(1) {
        match op().await {
            Ok(value) => return Some(value),
            Err(e) => {
                warn!("{} failed (attempt {}/{}): {}", label, attempt, max_attempts, e);
                if attempt < max_attempts {
                    tokio::time::sleep(base_delay * attempt).await;
                }
            }
        }
    }
    error!("{} gave up after {} attempts", label, max_attempts);
    None
}
