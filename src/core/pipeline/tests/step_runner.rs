use anyhow::anyhow;

use crate::core::pipeline::step::run_step;

#[tokio::test]
async fn returns_the_step_value_on_success() {
    let out = run_step("cid-1", "classify", async { Ok(42) }).await;
    assert_eq!(out.unwrap(), 42);
}

#[tokio::test]
async fn rethrows_the_original_error_unchanged() {
    let out: anyhow::Result<()> = run_step("cid-1", "summarize", async {
        Err(anyhow!("provider error: rate limited"))
    })
    .await;
    let err = out.unwrap_err();
    // No wrapping: the message is exactly what the step produced.
    assert_eq!(err.to_string(), "provider error: rate limited");
}

#[tokio::test]
async fn steps_run_to_completion_without_their_own_deadline() {
    // A slow step is the pipeline race's problem, not the runner's.
    let out = run_step("cid-1", "social", async {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        Ok("done")
    })
    .await;
    assert_eq!(out.unwrap(), "done");
}
