use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    AnalysisProvider, FollowUpEmail, MeetingKind, NextMeetingPrep, PriorMeeting, SocialPost,
    StructuredSummary, extract_json_block,
};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

// Wire shapes for the per-artifact JSON the model is asked to return.

#[derive(Deserialize)]
struct ClassifyWire {
    is_discovery: bool,
}

#[derive(Deserialize)]
struct FollowUpWire {
    subject: String,
    body: String,
}

#[derive(Deserialize)]
struct SocialWire {
    items: Vec<SocialPost>,
}

#[derive(Deserialize)]
struct MindMapWire {
    diagram: String,
}

pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
        }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: system,
                },
                ChatRequestMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.3,
        };

        let res = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!(
                "OpenAI API Error: {}",
                res.text().await.unwrap_or_default()
            ));
        }
        let parsed: ChatResponse = res.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Run one chat call and parse the JSON block out of the reply.
    async fn chat_json<T: serde::de::DeserializeOwned>(
        &self,
        label: &str,
        system: &str,
        user: &str,
    ) -> Result<T> {
        let out = self.chat(system, user).await?;
        let block = extract_json_block(&out)
            .ok_or_else(|| anyhow!("{} reply contained no JSON: {}", label, truncate(&out, 200)))?;
        serde_json::from_str(block)
            .map_err(|e| anyhow!("{} reply did not match the expected shape: {}", label, e))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn history_digest(history: &[PriorMeeting]) -> String {
    if history.is_empty() {
        return "No earlier meetings on record for this client.".to_string();
    }
    history
        .iter()
        .map(|m| {
            format!(
                "- {} ({}): {}{}",
                m.title,
                m.held_at,
                m.summary,
                m.goal
                    .as_deref()
                    .map(|g| format!(" [goal: {}]", g))
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl AnalysisProvider for OpenAiProvider {
    async fn classify(&self, transcript: &str) -> Result<MeetingKind> {
        let wire: ClassifyWire = self
            .chat_json(
                "classify",
                "You label sales-meeting transcripts. A discovery call is a first conversation \
                 exploring whether to work together; a consulting session is work with an \
                 existing client. Reply with JSON only: {\"is_discovery\": true|false}",
                transcript,
            )
            .await?;
        Ok(if wire.is_discovery {
            MeetingKind::Discovery
        } else {
            MeetingKind::Consulting
        })
    }

    async fn summarize(&self, transcript: &str, kind: MeetingKind) -> Result<StructuredSummary> {
        let system = format!(
            "Summarize this {} meeting transcript. Reply with JSON only: \
             {{\"client_name\": str, \"pain_point\": str, \"goal\": str, \
             \"suggestions\": [str], \"action_items\": [str], \"overview\": str}}. \
             overview is 3-5 sentences of plain prose.",
            kind.as_str()
        );
        self.chat_json("summarize", &system, transcript).await
    }

    async fn compose_follow_up(
        &self,
        summary: &StructuredSummary,
        kind: MeetingKind,
    ) -> Result<FollowUpEmail> {
        let system = format!(
            "Write a short follow-up email to the client after a {} meeting. \
             Professional, warm, no placeholders. Reply with JSON only: \
             {{\"subject\": str, \"body\": str}}",
            kind.as_str()
        );
        let user = serde_json::to_string(summary)?;
        let wire: FollowUpWire = self.chat_json("follow_up", &system, &user).await?;
        Ok(FollowUpEmail {
            subject: wire.subject,
            body: wire.body,
        })
    }

    async fn compose_social(&self, transcript: &str) -> Result<Vec<SocialPost>> {
        let wire: SocialWire = self
            .chat_json(
                "social",
                "Turn the most broadly useful insights of this transcript into 2-3 short-form \
                 video scripts. Never mention the client by name. Reply with JSON only: \
                 {\"items\": [{\"hook\": str, \"narrative\": str, \"cta\": str, \"tags\": [str]}]}",
                transcript,
            )
            .await?;
        Ok(wire.items)
    }

    async fn compose_mind_map(
        &self,
        summary: &StructuredSummary,
        kind: MeetingKind,
    ) -> Result<String> {
        let system = format!(
            "Encode the structure of this {} meeting summary as a Mermaid mindmap. \
             Root node is the client goal. Reply with JSON only: {{\"diagram\": str}} \
             where diagram starts with the line 'mindmap'.",
            kind.as_str()
        );
        let user = serde_json::to_string(summary)?;
        let wire: MindMapWire = self.chat_json("mind_map", &system, &user).await?;
        Ok(wire.diagram)
    }

    async fn compose_next_prep(
        &self,
        history: &[PriorMeeting],
        summary: &StructuredSummary,
    ) -> Result<NextMeetingPrep> {
        let user = format!(
            "LATEST MEETING:\n{}\n\nEARLIER MEETINGS:\n{}",
            serde_json::to_string(summary)?,
            history_digest(history)
        );
        self.chat_json(
            "next_prep",
            "Prepare talking points for the next meeting with this client, building on the \
             whole relationship history given. Reply with JSON only: \
             {\"focus_points\": [str], \"open_questions\": [str], \"suggested_agenda\": [str]}",
            &user,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_digest_handles_empty_history() {
        assert!(history_digest(&[]).contains("No earlier meetings"));
    }

    #[test]
    fn history_digest_lists_one_line_per_meeting() {
        let digest = history_digest(&[
            PriorMeeting {
                title: "Kickoff".to_string(),
                held_at: "2026-07-01 10:00:00".to_string(),
                summary: "Agreed on scope.".to_string(),
                goal: Some("double signups".to_string()),
            },
            PriorMeeting {
                title: "Check-in".to_string(),
                held_at: "2026-07-15 10:00:00".to_string(),
                summary: "Reviewed progress.".to_string(),
                goal: None,
            },
        ]);
        assert_eq!(digest.lines().count(), 2);
        assert!(digest.contains("[goal: double signups]"));
        assert!(digest.contains("Check-in"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
