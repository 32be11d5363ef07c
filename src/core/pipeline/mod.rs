//! Meeting-analysis pipeline: a strictly ordered sequence of AI steps run as
//! a detached background task, raced against one global deadline.
//!
//! Failure model: any step error aborts the remaining sequence and routes to
//! the conditional failed-transition; a timeout is treated the same way and
//! differs only in the recorded message. The success path persists all
//! artifacts and the status flip in one compare-and-set write, so a run that
//! loses the race against an already-terminal record changes nothing and
//! stays silent. Outcome notifications go out on their own task, after the
//! status write, never before.

pub mod artifacts;
pub mod retry;
pub mod status;
pub mod step;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::core::inference::{AnalysisProvider, PriorMeeting};
use crate::core::notify::{JobOutcomeMeta, NotificationKind, Notifier, dispatch_outcome};
use crate::core::store::AnalysisStore;
use artifacts::AnalysisArtifacts;
use retry::with_retry;
use step::run_step;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub timeout_ms: u64,
    pub social_write_attempts: u32,
    pub social_write_base_delay_ms: u64,
    pub token_ttl_secs: u64,
}

/// Shared dependencies of every job run.
pub struct PipelineContext {
    pub store: Arc<AnalysisStore>,
    pub provider: Arc<dyn AnalysisProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: PipelineSettings,
    pub token_secret: String,
}

/// Per-job inputs, fixed at admission.
#[derive(Debug, Clone)]
pub struct AnalysisJobSpec {
    pub job_id: String,
    pub owner_id: String,
    pub correlation_id: String,
    pub title: String,
    pub transcript: String,
    pub notify_email: Option<String>,
}

enum PersistOutcome {
    /// The compare-and-set completion write applied.
    Completed { client_name: String },
    /// The record was already terminal; this run's result was discarded.
    Superseded,
}

/// Entry point for one job. Runs to a terminal outcome and never returns an
/// error: everything that can go wrong ends up in the record and the logs.
pub async fn run_analysis_job(ctx: Arc<PipelineContext>, job: AnalysisJobSpec) {
    let cid = job.correlation_id.clone();
    let deadline = Duration::from_millis(ctx.settings.timeout_ms);
    info!(
        "[{}] analysis pipeline started for job {} ({}ms budget)",
        cid,
        job.job_id,
        ctx.settings.timeout_ms
    );

    match tokio::time::timeout(deadline, execute_steps(&ctx, &job)).await {
        Ok(Ok(PersistOutcome::Completed { client_name })) => {
            info!("[{}] job {} completed", cid, job.job_id);
            notify_outcome(
                &ctx,
                &job,
                NotificationKind::Completed,
                Some(client_name),
                None,
            );
        }
        Ok(Ok(PersistOutcome::Superseded)) => {
            warn!(
                "[{}] job {} finished after its record was already terminal; result discarded",
                cid, job.job_id
            );
        }
        Ok(Err(e)) => {
            finalize_failure(&ctx, &job, e.to_string()).await;
        }
        Err(_) => {
            finalize_failure(
                &ctx,
                &job,
                format!("analysis timed out after {}ms", ctx.settings.timeout_ms),
            )
            .await;
        }
    }
}

/// Steps 1-7 in order. Each provider call goes through the step runner; the
/// caller holds the global deadline.
async fn execute_steps(ctx: &PipelineContext, job: &AnalysisJobSpec) -> Result<PersistOutcome> {
    let cid = &job.correlation_id;
    let provider = &ctx.provider;

    let kind = run_step(cid, "classify", provider.classify(&job.transcript)).await?;
    let summary = run_step(cid, "summarize", provider.summarize(&job.transcript, kind)).await?;
    let follow_up = run_step(cid, "follow_up", provider.compose_follow_up(&summary, kind)).await?;
    let social_posts = run_step(cid, "social", provider.compose_social(&job.transcript)).await?;
    let mind_map = run_step(cid, "mind_map", provider.compose_mind_map(&summary, kind)).await?;

    let next_prep = run_step(cid, "next_prep", async {
        // First meeting with a client legitimately has no history; the
        // provider receives an empty list and composes from the summary alone.
        let prior = ctx
            .store
            .list_prior_completed_jobs(&job.owner_id, &summary.client_name)
            .await?;
        let history: Vec<PriorMeeting> = prior
            .iter()
            .map(|rec| PriorMeeting {
                title: rec.title.clone(),
                held_at: rec.created_at.clone(),
                summary: rec.summary.clone().unwrap_or_default(),
                goal: rec.goal.clone(),
            })
            .collect();
        provider.compose_next_prep(&history, &summary).await
    })
    .await?;

    let gathered = AnalysisArtifacts {
        kind,
        summary,
        follow_up,
        social_posts,
        mind_map,
        next_prep,
    };
    run_step(cid, "persist", persist_artifacts(ctx, job, gathered)).await
}

/// Step 7: one conditional write for the full artifact set and the status
/// flip, then the social-post sub-artifacts on a bounded retry whose failure
/// is swallowed once the primary record has committed.
async fn persist_artifacts(
    ctx: &PipelineContext,
    job: &AnalysisJobSpec,
    gathered: AnalysisArtifacts,
) -> Result<PersistOutcome> {
    if !ctx.store.complete_job(&job.job_id, &gathered).await? {
        return Ok(PersistOutcome::Superseded);
    }

    let store = &ctx.store;
    let posts = &gathered.social_posts;
    let written = with_retry(
        "social posts write",
        ctx.settings.social_write_attempts,
        Duration::from_millis(ctx.settings.social_write_base_delay_ms),
        || store.upsert_social_posts(&job.job_id, posts),
    )
    .await;
    if written.is_none() {
        warn!(
            "[{}] social posts for job {} were not persisted; job remains completed",
            job.correlation_id, job.job_id
        );
    }

    Ok(PersistOutcome::Completed {
        client_name: gathered.summary.client_name.clone(),
    })
}

/// Shared landing for step failures and timeouts. The conditional transition
/// keeps an already-completed record untouched, and a store error here is
/// logged rather than raised: this path must never throw.
async fn finalize_failure(ctx: &PipelineContext, job: &AnalysisJobSpec, reason: String) {
    error!("[{}] job {} failed: {}", job.correlation_id, job.job_id, reason);

    match ctx.store.mark_failed_if_processing(&job.job_id, &reason).await {
        Ok(true) => {
            notify_outcome(ctx, job, NotificationKind::Failed, None, Some(reason));
        }
        Ok(false) => {
            info!(
                "[{}] job {} already reached a terminal state; failure transition skipped",
                job.correlation_id, job.job_id
            );
        }
        Err(e) => {
            warn!(
                "[{}] could not record failure for job {}: {}",
                job.correlation_id, job.job_id, e
            );
        }
    }
}

/// Exactly one notification per terminal outcome, dispatched detached so a
/// slow or broken channel can never stall or corrupt the job itself.
fn notify_outcome(
    ctx: &PipelineContext,
    job: &AnalysisJobSpec,
    kind: NotificationKind,
    client_name: Option<String>,
    error: Option<String>,
) {
    let Some(recipient) = job.notify_email.clone() else {
        info!(
            "[{}] no notification recipient for job {}; skipping {} message",
            job.correlation_id,
            job.job_id,
            kind.as_str()
        );
        return;
    };

    let _ = dispatch_outcome(
        ctx.notifier.clone(),
        &ctx.token_secret,
        ctx.settings.token_ttl_secs,
        recipient,
        kind,
        JobOutcomeMeta {
            job_id: job.job_id.clone(),
            meeting_title: job.title.clone(),
            client_name,
            error,
        },
    );
}
