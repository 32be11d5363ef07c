use std::future::Future;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info};

/// Run one named unit of pipeline work: await the future, log how long it
/// took and how it ended, and hand the original error back untouched. No
/// per-step deadline lives here; the whole pipeline races one global timeout.
pub async fn run_step<T, F>(correlation_id: &str, name: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started = Instant::now();
    match fut.await {
        Ok(value) => {
            info!(
                "[{}] step {} completed in {}ms",
                correlation_id,
                name,
                started.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(e) => {
            error!(
                "[{}] step {} failed after {}ms: {}",
                correlation_id,
                name,
                started.elapsed().as_millis(),
                e
            );
            Err(e)
        }
    }
}
