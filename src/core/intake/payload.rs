//! Per-provider webhook payload shapes and their mapping into the canonical
//! meeting input. A closed set: each provider gets its own serde types and
//! one normalization function, so shape drift in one provider cannot leak
//! into another.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{MeetingInput, MeetingSource};

pub enum WebhookEvent {
    /// A genuinely completed meeting, normalized and ready for admission.
    Completed(MeetingInput),
    /// Anything else (reminders, started events, deletions). Not an error.
    Ignored(&'static str),
}

// --- Zoom ---

#[derive(Deserialize)]
struct ZoomWebhook {
    event: String,
    payload: ZoomPayload,
}

#[derive(Deserialize)]
struct ZoomPayload {
    #[serde(default)]
    account_id: Option<String>,
    object: ZoomMeetingObject,
}

#[derive(Deserialize)]
struct ZoomMeetingObject {
    id: u64,
    topic: String,
    host_email: String,
    /// Already minutes on the Zoom side.
    #[serde(default)]
    duration: Option<i64>,
    #[serde(default)]
    participants: Vec<ZoomParticipant>,
    #[serde(default)]
    recording_files: Vec<ZoomRecordingFile>,
    #[serde(default)]
    transcript_content: Option<String>,
}

#[derive(Deserialize)]
struct ZoomParticipant {
    user_name: String,
}

#[derive(Deserialize)]
struct ZoomRecordingFile {
    file_type: String,
    #[serde(default)]
    download_url: Option<String>,
}

fn normalize_zoom(body: &str) -> Result<WebhookEvent> {
    let hook: ZoomWebhook = serde_json::from_str(body).context("invalid Zoom webhook body")?;

    if hook.event != "recording.completed" {
        return Ok(WebhookEvent::Ignored("not a completed-recording event"));
    }

    let metadata = hook
        .payload
        .account_id
        .as_ref()
        .map(|id| serde_json::json!({ "account_id": id }));
    let object = hook.payload.object;
    let recording_url = object
        .recording_files
        .iter()
        .find(|f| f.file_type.eq_ignore_ascii_case("MP4"))
        .and_then(|f| f.download_url.clone());

    Ok(WebhookEvent::Completed(MeetingInput {
        source: MeetingSource::Zoom,
        external_meeting_id: Some(object.id.to_string()),
        owner_id: object.host_email.clone(),
        title: object.topic,
        transcript: object.transcript_content.unwrap_or_default(),
        duration_minutes: object.duration,
        participants: object
            .participants
            .into_iter()
            .map(|p| p.user_name)
            .collect(),
        recording_url,
        notify_email: Some(object.host_email),
        metadata,
    }))
}

// --- Google Meet ---

#[derive(Deserialize)]
struct GoogleWebhook {
    event_type: String,
    conference: GoogleConference,
}

#[derive(Deserialize)]
struct GoogleConference {
    conference_id: String,
    organizer_email: String,
    #[serde(default)]
    summary: Option<String>,
    /// Seconds on the Google side; normalized to minutes here.
    #[serde(default)]
    duration_seconds: Option<i64>,
    #[serde(default)]
    attendees: Vec<String>,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    space_uri: Option<String>,
}

fn normalize_google(body: &str) -> Result<WebhookEvent> {
    let hook: GoogleWebhook =
        serde_json::from_str(body).context("invalid Google Meet webhook body")?;

    if hook.event_type != "conference.ended" {
        return Ok(WebhookEvent::Ignored("conference has not ended"));
    }

    let conference = hook.conference;
    let metadata = conference
        .space_uri
        .as_ref()
        .map(|uri| serde_json::json!({ "space_uri": uri }));
    Ok(WebhookEvent::Completed(MeetingInput {
        source: MeetingSource::Google,
        external_meeting_id: Some(conference.conference_id),
        owner_id: conference.organizer_email.clone(),
        title: conference
            .summary
            .unwrap_or_else(|| "Google Meet conference".to_string()),
        transcript: conference.transcript.unwrap_or_default(),
        duration_minutes: conference.duration_seconds.map(|s| s / 60),
        participants: conference.attendees,
        recording_url: None,
        notify_email: Some(conference.organizer_email),
        metadata,
    }))
}

pub fn normalize(source: MeetingSource, body: &str) -> Result<WebhookEvent> {
    match source {
        MeetingSource::Zoom => normalize_zoom(body),
        MeetingSource::Google => normalize_google(body),
        MeetingSource::Upload => anyhow::bail!("uploads do not arrive via webhook"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoom_body(event: &str, transcript: Option<&str>) -> String {
        serde_json::json!({
            "event": event,
            "payload": {
                "account_id": "acc-42",
                "object": {
                    "id": 987654321u64,
                    "topic": "Quarterly strategy review",
                    "host_email": "host@example.com",
                    "duration": 45,
                    "participants": [
                        { "user_name": "Dana" },
                        { "user_name": "Robin" }
                    ],
                    "recording_files": [
                        { "file_type": "MP4", "download_url": "https://zoom.example/rec.mp4" },
                        { "file_type": "TIMELINE", "download_url": null }
                    ],
                    "transcript_content": transcript
                }
            }
        })
        .to_string()
    }

    #[test]
    fn zoom_completed_recording_is_normalized() {
        let event = normalize(
            MeetingSource::Zoom,
            &zoom_body("recording.completed", Some("hello world")),
        )
        .unwrap();
        let WebhookEvent::Completed(input) = event else {
            panic!("expected a completed event");
        };
        assert_eq!(input.source, MeetingSource::Zoom);
        assert_eq!(input.external_meeting_id.as_deref(), Some("987654321"));
        assert_eq!(input.owner_id, "host@example.com");
        assert_eq!(input.duration_minutes, Some(45));
        assert_eq!(input.participants, vec!["Dana", "Robin"]);
        assert_eq!(
            input.recording_url.as_deref(),
            Some("https://zoom.example/rec.mp4")
        );
        assert_eq!(input.notify_email.as_deref(), Some("host@example.com"));
        assert_eq!(input.metadata.unwrap()["account_id"], "acc-42");
    }

    #[test]
    fn zoom_other_events_are_ignored() {
        let event = normalize(MeetingSource::Zoom, &zoom_body("meeting.started", None)).unwrap();
        assert!(matches!(event, WebhookEvent::Ignored(_)));
    }

    #[test]
    fn zoom_missing_transcript_yields_empty_transcript() {
        // Admission (not normalization) is responsible for filtering these.
        let event = normalize(
            MeetingSource::Zoom,
            &zoom_body("recording.completed", None),
        )
        .unwrap();
        let WebhookEvent::Completed(input) = event else {
            panic!("expected a completed event");
        };
        assert!(input.transcript.is_empty());
    }

    #[test]
    fn google_duration_is_converted_to_minutes() {
        let body = serde_json::json!({
            "event_type": "conference.ended",
            "conference": {
                "conference_id": "abc-defg-hij",
                "organizer_email": "owner@example.com",
                "summary": "Design sync",
                "duration_seconds": 1800,
                "attendees": ["owner@example.com", "guest@example.com"],
                "transcript": "we talked"
            }
        })
        .to_string();
        let event = normalize(MeetingSource::Google, &body).unwrap();
        let WebhookEvent::Completed(input) = event else {
            panic!("expected a completed event");
        };
        assert_eq!(input.duration_minutes, Some(30));
        assert_eq!(input.participants.len(), 2);
        assert_eq!(input.title, "Design sync");
    }

    #[test]
    fn google_non_ended_events_are_ignored() {
        let body = serde_json::json!({
            "event_type": "conference.started",
            "conference": {
                "conference_id": "abc",
                "organizer_email": "owner@example.com"
            }
        })
        .to_string();
        let event = normalize(MeetingSource::Google, &body).unwrap();
        assert!(matches!(event, WebhookEvent::Ignored(_)));
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(normalize(MeetingSource::Zoom, "{not json").is_err());
        assert!(normalize(MeetingSource::Google, "{}").is_err());
    }
}
