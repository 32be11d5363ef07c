//! Admission layer: normalizes heterogeneous inbound triggers into one
//! canonical meeting input, filters out non-actionable events, and launches
//! the pipeline detached so the caller gets its acknowledgment immediately.

pub mod payload;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::core::pipeline::{AnalysisJobSpec, PipelineContext, run_analysis_job};
use crate::core::store::NewJob;

pub const FILTERED_OUT: &str = "FILTERED_OUT";
pub const STORE_ERROR: &str = "STORE_ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingSource {
    Upload,
    Zoom,
    Google,
}

impl MeetingSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingSource::Upload => "upload",
            MeetingSource::Zoom => "zoom",
            MeetingSource::Google => "google",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        match value {
            "upload" => Some(MeetingSource::Upload),
            "zoom" => Some(MeetingSource::Zoom),
            "google" => Some(MeetingSource::Google),
            _ => None,
        }
    }
}

/// Canonical form every trigger is reduced to before a job is admitted.
/// Lives only for the handoff; the job row is the durable copy.
#[derive(Debug, Clone)]
pub struct MeetingInput {
    pub source: MeetingSource,
    pub external_meeting_id: Option<String>,
    pub owner_id: String,
    pub title: String,
    pub transcript: String,
    pub duration_minutes: Option<i64>,
    pub participants: Vec<String>,
    pub recording_url: Option<String>,
    pub notify_email: Option<String>,
    /// Provider-specific extras carried through unparsed.
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerError {
    pub code: &'static str,
    pub message: String,
}

/// What the caller gets back, always immediately: the correlation id is
/// assigned at entry and returned even when the input was filtered out.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerOutcome {
    pub success: bool,
    pub correlation_id: String,
    pub job_id: Option<String>,
    pub error: Option<TriggerError>,
}

impl TriggerOutcome {
    fn filtered(correlation_id: String, message: impl Into<String>) -> Self {
        Self {
            success: false,
            correlation_id,
            job_id: None,
            error: Some(TriggerError {
                code: FILTERED_OUT,
                message: message.into(),
            }),
        }
    }
}

pub struct AutoAnalysisService {
    ctx: Arc<PipelineContext>,
}

impl AutoAnalysisService {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self { ctx }
    }

    /// Admit one canonical input: filter, create the `processing` record,
    /// launch the pipeline detached, return the acknowledgment.
    pub async fn trigger_analysis(&self, input: MeetingInput) -> TriggerOutcome {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        info!(
            "[{}] intake from {}: \"{}\" for owner {}",
            correlation_id,
            input.source.as_str(),
            input.title,
            input.owner_id
        );

        if input.transcript.trim().is_empty() {
            info!("[{}] filtered out: no transcript", correlation_id);
            return TriggerOutcome::filtered(correlation_id, "meeting has no transcript");
        }

        let metadata_json = input
            .metadata
            .as_ref()
            .map(|m| m.to_string());
        let created = self
            .ctx
            .store
            .create_job(&NewJob {
                owner_id: &input.owner_id,
                title: &input.title,
                source: input.source.as_str(),
                external_meeting_id: input.external_meeting_id.as_deref(),
                transcript: &input.transcript,
                duration_minutes: input.duration_minutes,
                participants: &input.participants,
                notify_email: input.notify_email.as_deref(),
                metadata_json: metadata_json.as_deref(),
            })
            .await;

        let job = match created {
            Ok(job) => job,
            Err(e) => {
                warn!("[{}] could not create job record: {}", correlation_id, e);
                return TriggerOutcome {
                    success: false,
                    correlation_id,
                    job_id: None,
                    error: Some(TriggerError {
                        code: STORE_ERROR,
                        message: e.to_string(),
                    }),
                };
            }
        };

        let spec = AnalysisJobSpec {
            job_id: job.job_id.clone(),
            owner_id: input.owner_id,
            correlation_id: correlation_id.clone(),
            title: input.title,
            transcript: input.transcript,
            notify_email: input.notify_email,
        };
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            run_analysis_job(ctx, spec).await;
        });

        TriggerOutcome {
            success: true,
            correlation_id,
            job_id: Some(job.job_id),
            error: None,
        }
    }

    /// Webhook entry: parse and normalize the provider payload, then run the
    /// same admission path. Events that are not a completed meeting are
    /// filtered, not failed.
    pub async fn trigger_webhook(&self, source: MeetingSource, body: &str) -> TriggerOutcome {
        match payload::normalize(source, body) {
            Ok(payload::WebhookEvent::Completed(input)) => self.trigger_analysis(input).await,
            Ok(payload::WebhookEvent::Ignored(reason)) => {
                let correlation_id = uuid::Uuid::new_v4().to_string();
                info!("[{}] webhook from {} filtered out: {}", correlation_id, source.as_str(), reason);
                TriggerOutcome::filtered(correlation_id, reason)
            }
            Err(e) => {
                let correlation_id = uuid::Uuid::new_v4().to_string();
                warn!(
                    "[{}] unparseable {} webhook payload: {}",
                    correlation_id,
                    source.as_str(),
                    e
                );
                TriggerOutcome {
                    success: false,
                    correlation_id,
                    job_id: None,
                    error: Some(TriggerError {
                        code: "BAD_PAYLOAD",
                        message: e.to_string(),
                    }),
                }
            }
        }
    }
}
