pub mod mailer;
pub mod token;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Completed,
    Failed,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Completed => "completed",
            NotificationKind::Failed => "failed",
        }
    }
}

/// Everything a template needs to render one outcome message.
#[derive(Debug, Clone)]
pub struct NotificationParams {
    pub job_id: String,
    pub meeting_title: String,
    pub client_name: Option<String>,
    pub error: Option<String>,
    pub access_token: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one templated message. `Ok(false)` means the channel declined
    /// (e.g. notifications disabled), which is not an error.
    async fn send(
        &self,
        recipient: &str,
        kind: NotificationKind,
        params: &NotificationParams,
    ) -> Result<bool>;
}

/// Human-readable context for one terminal job outcome.
#[derive(Debug, Clone)]
pub struct JobOutcomeMeta {
    pub job_id: String,
    pub meeting_title: String,
    pub client_name: Option<String>,
    pub error: Option<String>,
}

/// Fire the outcome notification on its own task, fully isolated from the
/// pipeline: whatever happens in here is logged and dropped, never touching
/// the job's terminal status. Callers must invoke this only after the status
/// write has settled.
pub fn dispatch_outcome(
    notifier: Arc<dyn Notifier>,
    token_secret: &str,
    token_ttl_secs: u64,
    recipient: String,
    kind: NotificationKind,
    meta: JobOutcomeMeta,
) -> tokio::task::JoinHandle<()> {
    let access_token = token::issue(token_secret, &meta.job_id, &recipient, token_ttl_secs);
    let params = NotificationParams {
        job_id: meta.job_id,
        meeting_title: meta.meeting_title,
        client_name: meta.client_name,
        error: meta.error,
        access_token,
    };

    tokio::spawn(async move {
        match notifier.send(&recipient, kind, &params).await {
            Ok(true) => info!(
                "Sent {} notification for job {} to {}",
                kind.as_str(),
                params.job_id,
                recipient
            ),
            Ok(false) => info!(
                "Notification channel declined {} message for job {}",
                kind.as_str(),
                params.job_id
            ),
            Err(e) => warn!(
                "Notification dispatch failed for job {}: {}",
                params.job_id, e
            ),
        }
    })
}
