use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{NotificationKind, NotificationParams, Notifier};

/// Sends outcome messages through an HTTP mail relay (Resend-style JSON API).
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

fn render(kind: NotificationKind, params: &NotificationParams) -> (String, String) {
    let link = format!(
        "/analyses/{}?token={}",
        params.job_id, params.access_token
    );
    let client_line = params
        .client_name
        .as_deref()
        .map(|c| format!("<p>Client: {}</p>", c))
        .unwrap_or_default();

    match kind {
        NotificationKind::Completed => (
            format!("Your analysis of \"{}\" is ready", params.meeting_title),
            format!(
                "<p>The analysis of <b>{}</b> finished successfully.</p>{}\
                 <p><a href=\"{}\">View the full analysis</a></p>",
                params.meeting_title, client_line, link
            ),
        ),
        NotificationKind::Failed => (
            format!("Analysis of \"{}\" could not be completed", params.meeting_title),
            format!(
                "<p>The analysis of <b>{}</b> did not finish.</p>{}<p>Reason: {}</p>\
                 <p>You can re-upload the transcript to try again.</p>",
                params.meeting_title,
                client_line,
                params.error.as_deref().unwrap_or("unknown error")
            ),
        ),
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(
        &self,
        recipient: &str,
        kind: NotificationKind,
        params: &NotificationParams,
    ) -> Result<bool> {
        let (subject, html) = render(kind, params);
        let body = serde_json::json!({
            "from": self.from,
            "to": [recipient],
            "subject": subject,
            "html": html,
        });

        let res = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!(
                "Mail relay error ({}): {}",
                res.status(),
                res.text().await.unwrap_or_default()
            ));
        }
        Ok(true)
    }
}

/// Stand-in when no relay is configured; declines every message.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(
        &self,
        recipient: &str,
        kind: NotificationKind,
        params: &NotificationParams,
    ) -> Result<bool> {
        debug!(
            "Dropping {} notification for job {} to {} (no relay configured)",
            kind.as_str(),
            params.job_id,
            recipient
        );
        Ok(false)
    }
}
