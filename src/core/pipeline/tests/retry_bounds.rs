use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::anyhow;

use crate::core::pipeline::retry::with_retry;

#[tokio::test(start_paused = true)]
async fn exhausts_exactly_max_attempts_with_linear_backoff() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_in_op = calls.clone();
    let base = Duration::from_millis(100);

    let started = tokio::time::Instant::now();
    let out: Option<()> = with_retry("doomed write", 3, base, || {
        let calls = calls_in_op.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("disk full"))
        }
    })
    .await;

    assert!(out.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Paused clock: sleeps auto-advance, so elapsed is exactly the backoff
    // schedule base*1 + base*2. No delay follows the final attempt.
    assert_eq!(started.elapsed(), base * 3);
}

#[tokio::test(start_paused = true)]
async fn stops_retrying_after_the_first_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_in_op = calls.clone();

    let out = with_retry("flaky write", 5, Duration::from_millis(100), || {
        let calls = calls_in_op.clone();
        async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow!("transient"))
            } else {
                Ok("stored")
            }
        }
    })
    .await;

    assert_eq!(out, Some("stored"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn treats_zero_attempts_as_one() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_in_op = calls.clone();

    let out: Option<()> = with_retry("misconfigured", 0, Duration::from_millis(1), || {
        let calls = calls_in_op.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("still failing"))
        }
    })
    .await;

    assert!(out.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
