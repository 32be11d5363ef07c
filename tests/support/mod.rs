#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::Mutex;

use debrief::core::inference::{
    AnalysisProvider, FollowUpEmail, MeetingKind, NextMeetingPrep, PriorMeeting, SocialPost,
    StructuredSummary,
};
use debrief::core::notify::{NotificationKind, NotificationParams, Notifier};
use debrief::core::pipeline::{PipelineContext, PipelineSettings};
use debrief::core::store::AnalysisStore;

/// Deterministic provider: canned artifacts, an optional per-call delay, and
/// an optional step that always fails.
pub struct ScriptedProvider {
    pub fail_step: Option<&'static str>,
    pub step_delay: Duration,
}

impl ScriptedProvider {
    pub fn ok() -> Self {
        Self {
            fail_step: None,
            step_delay: Duration::ZERO,
        }
    }

    pub fn failing_at(step: &'static str) -> Self {
        Self {
            fail_step: Some(step),
            step_delay: Duration::ZERO,
        }
    }

    pub fn slow(step_delay: Duration) -> Self {
        Self {
            fail_step: None,
            step_delay,
        }
    }

    async fn gate(&self, step: &'static str) -> Result<()> {
        if self.step_delay > Duration::ZERO {
            tokio::time::sleep(self.step_delay).await;
        }
        if self.fail_step == Some(step) {
            return Err(anyhow!("provider error: {} unavailable", step));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalysisProvider for ScriptedProvider {
    async fn classify(&self, transcript: &str) -> Result<MeetingKind> {
        self.gate("classify").await?;
        Ok(if transcript.contains("first call") {
            MeetingKind::Discovery
        } else {
            MeetingKind::Consulting
        })
    }

    async fn summarize(&self, _transcript: &str, _kind: MeetingKind) -> Result<StructuredSummary> {
        self.gate("summarize").await?;
        Ok(StructuredSummary {
            client_name: "Client X".to_string(),
            pain_point: "revenue growth has stalled".to_string(),
            goal: "grow revenue 20%".to_string(),
            suggestions: vec!["audit the sales funnel".to_string()],
            action_items: vec!["send pricing proposal".to_string()],
            overview: "Client X wants to grow revenue by 20% this year.".to_string(),
        })
    }

    async fn compose_follow_up(
        &self,
        summary: &StructuredSummary,
        _kind: MeetingKind,
    ) -> Result<FollowUpEmail> {
        self.gate("follow_up").await?;
        Ok(FollowUpEmail {
            subject: format!("Next steps for {}", summary.client_name),
            body: "Thanks for the conversation today.".to_string(),
        })
    }

    async fn compose_social(&self, _transcript: &str) -> Result<Vec<SocialPost>> {
        self.gate("social").await?;
        Ok(vec![
            SocialPost {
                hook: "Most businesses stall for one reason".to_string(),
                narrative: "Growth hides in the funnel you stopped measuring.".to_string(),
                cta: "Follow for more".to_string(),
                tags: vec!["growth".to_string()],
            },
            SocialPost {
                hook: "A 20% lift is rarely about working harder".to_string(),
                narrative: "Pricing fixes compound faster than volume fixes.".to_string(),
                cta: "Share this with a founder".to_string(),
                tags: vec!["pricing".to_string(), "strategy".to_string()],
            },
        ])
    }

    async fn compose_mind_map(
        &self,
        summary: &StructuredSummary,
        _kind: MeetingKind,
    ) -> Result<String> {
        self.gate("mind_map").await?;
        Ok(format!("mindmap\n  root(({}))\n    Pain\n    Plan", summary.goal))
    }

    async fn compose_next_prep(
        &self,
        history: &[PriorMeeting],
        _summary: &StructuredSummary,
    ) -> Result<NextMeetingPrep> {
        self.gate("next_prep").await?;
        Ok(NextMeetingPrep {
            focus_points: vec![format!("{} earlier meetings on record", history.len())],
            open_questions: vec!["What budget is approved?".to_string()],
            suggested_agenda: vec!["Review proposal".to_string()],
        })
    }
}

/// Records every dispatch attempt; optionally errors on each send to prove
/// notification failures stay contained.
pub struct RecordingNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, NotificationKind, NotificationParams)>>,
}

impl RecordingNotifier {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub async fn attempts(&self) -> Vec<(String, NotificationKind, NotificationParams)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        recipient: &str,
        kind: NotificationKind,
        params: &NotificationParams,
    ) -> Result<bool> {
        self.sent
            .lock()
            .await
            .push((recipient.to_string(), kind, params.clone()));
        if self.fail {
            return Err(anyhow!("smtp relay unreachable"));
        }
        Ok(true)
    }
}

pub struct TestHarness {
    pub ctx: Arc<PipelineContext>,
    pub store: Arc<AnalysisStore>,
    pub notifier: Arc<RecordingNotifier>,
    _data_dir: tempfile::TempDir,
}

pub async fn harness(provider: ScriptedProvider, notifier: RecordingNotifier) -> TestHarness {
    harness_with_timeout(provider, notifier, 30_000).await
}

pub async fn harness_with_timeout(
    provider: ScriptedProvider,
    notifier: RecordingNotifier,
    timeout_ms: u64,
) -> TestHarness {
    let data_dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(AnalysisStore::new(data_dir.path()).await.expect("store"));
    let notifier = Arc::new(notifier);

    let ctx = Arc::new(PipelineContext {
        store: store.clone(),
        provider: Arc::new(provider),
        notifier: notifier.clone(),
        settings: PipelineSettings {
            timeout_ms,
            social_write_attempts: 3,
            social_write_base_delay_ms: 5,
            token_ttl_secs: 3600,
        },
        token_secret: "test-secret".to_string(),
    });

    TestHarness {
        ctx,
        store,
        notifier,
        _data_dir: data_dir,
    }
}

/// Poll until the condition holds or a few seconds pass.
pub async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
