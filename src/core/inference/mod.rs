pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    Discovery,
    Consulting,
}

impl MeetingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingKind::Discovery => "discovery",
            MeetingKind::Consulting => "consulting",
        }
    }

    pub fn is_discovery(self) -> bool {
        self == MeetingKind::Discovery
    }
}

/// Structured summary of one meeting. `overview` is the narrative text; the
/// remaining fields are extracted facts used by downstream steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub client_name: String,
    pub pain_point: String,
    pub goal: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    pub overview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpEmail {
    pub subject: String,
    pub body: String,
}

/// One short-form video script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPost {
    pub hook: String,
    pub narrative: String,
    pub cta: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextMeetingPrep {
    #[serde(default)]
    pub focus_points: Vec<String>,
    #[serde(default)]
    pub open_questions: Vec<String>,
    #[serde(default)]
    pub suggested_agenda: Vec<String>,
}

/// Condensed view of an earlier completed analysis for the same client,
/// fed into the next-meeting preparation step.
#[derive(Debug, Clone, Serialize)]
pub struct PriorMeeting {
    pub title: String,
    pub held_at: String,
    pub summary: String,
    pub goal: Option<String>,
}

/// One call per artifact. Any failure or provider-side timeout surfaces as an
/// error from the individual method; the pipeline decides what that means.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn classify(&self, transcript: &str) -> Result<MeetingKind>;

    async fn summarize(&self, transcript: &str, kind: MeetingKind) -> Result<StructuredSummary>;

    async fn compose_follow_up(
        &self,
        summary: &StructuredSummary,
        kind: MeetingKind,
    ) -> Result<FollowUpEmail>;

    async fn compose_social(&self, transcript: &str) -> Result<Vec<SocialPost>>;

    /// Returns a hierarchical diagram encoding (Mermaid `mindmap` text).
    async fn compose_mind_map(&self, summary: &StructuredSummary, kind: MeetingKind)
    -> Result<String>;

    async fn compose_next_prep(
        &self,
        history: &[PriorMeeting],
        summary: &StructuredSummary,
    ) -> Result<NextMeetingPrep>;
}

/// Extract a JSON block from model output. Tries fenced ```json ... ``` first,
/// then raw JSON starting with `{` or `[`.
pub(crate) fn extract_json_block(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let content_start = start + 7;
        if let Some(end) = trimmed[content_start..].find("```") {
            let block = trimmed[content_start..content_start + end].trim();
            if !block.is_empty() {
                return Some(block);
            }
        }
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(trimmed);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json() {
        let out = "Here you go:\n```json\n{\"goal\": \"grow\"}\n```\nanything after";
        assert_eq!(extract_json_block(out), Some("{\"goal\": \"grow\"}"));
    }

    #[test]
    fn extracts_raw_json_object_and_array() {
        assert_eq!(extract_json_block("  {\"a\": 1}  "), Some("{\"a\": 1}"));
        assert_eq!(extract_json_block("[1, 2]"), Some("[1, 2]"));
    }

    #[test]
    fn rejects_prose_without_json() {
        assert_eq!(extract_json_block("I could not produce a summary."), None);
        assert_eq!(extract_json_block("```json\n```"), None);
    }
}
