use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};

use super::super::AppState;
use crate::core::intake::{MeetingInput, MeetingSource};
use crate::core::notify::token;
use crate::core::pipeline::status::JobStatus;
use crate::core::store::types::AnalysisJobRecord;

fn owner_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-owner-id")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(serde::Deserialize)]
pub struct CreateAnalysisRequest {
    pub title: String,
    pub transcript: String,
    #[serde(default)]
    pub notify_email: Option<String>,
}

/// Manual upload trigger. Acknowledges immediately; the pipeline keeps
/// running after this response is sent.
pub async fn create_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAnalysisRequest>,
) -> Json<serde_json::Value> {
    let Some(owner_id) = owner_from_headers(&headers) else {
        return Json(serde_json::json!({ "success": false, "error": "x-owner-id header is required" }));
    };

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Json(serde_json::json!({ "success": false, "error": "title is required" }));
    }

    let outcome = state
        .intake
        .trigger_analysis(MeetingInput {
            source: MeetingSource::Upload,
            external_meeting_id: None,
            owner_id,
            title,
            transcript: payload.transcript,
            duration_minutes: None,
            participants: Vec::new(),
            recording_url: None,
            notify_email: payload.notify_email,
            metadata: None,
        })
        .await;

    let status = outcome.job_id.as_ref().map(|_| JobStatus::Processing.as_str());
    Json(serde_json::json!({
        "success": outcome.success,
        "correlation_id": outcome.correlation_id,
        "job_id": outcome.job_id,
        "status": status,
        "error": outcome.error,
    }))
}

#[derive(serde::Deserialize)]
pub struct ReadQuery {
    #[serde(default)]
    pub token: Option<String>,
}

fn job_view(rec: &AnalysisJobRecord) -> serde_json::Value {
    let terminal = JobStatus::from_status(&rec.status)
        .map(JobStatus::is_terminal)
        .unwrap_or(false);
    let mut view = serde_json::to_value(rec).unwrap_or_default();
    if let Some(map) = view.as_object_mut() {
        map.insert("terminal".to_string(), serde_json::json!(terminal));
        // The raw transcript is large and not needed by status readers.
        map.remove("transcript");
    }
    view
}

/// Status/artifact read. Access is either the owner (trusted header) or a
/// bearer of the signed notification token for this job.
pub async fn get_analysis(
    Path(job_id): Path<String>,
    Query(query): Query<ReadQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let rec = match state.store.get_job(&job_id).await {
        Ok(Some(rec)) => rec,
        Ok(None) => {
            return Json(serde_json::json!({ "success": false, "error": "Analysis not found" }));
        }
        Err(e) => {
            return Json(
                serde_json::json!({ "success": false, "error": format!("Database error: {}", e) }),
            );
        }
    };

    let owner_ok = owner_from_headers(&headers).is_some_and(|owner| owner == rec.owner_id);
    let token_ok = query
        .token
        .as_deref()
        .and_then(|t| token::verify(&state.pipeline.token_secret, &job_id, t))
        .is_some();
    if !owner_ok && !token_ok {
        return Json(serde_json::json!({ "success": false, "error": "Not authorized" }));
    }

    Json(serde_json::json!({ "success": true, "analysis": job_view(&rec) }))
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn list_analyses(
    Query(query): Query<ListQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let Some(owner_id) = owner_from_headers(&headers) else {
        return Json(serde_json::json!({ "success": false, "error": "x-owner-id header is required" }));
    };

    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    match state.store.list_jobs(&owner_id, limit).await {
        Ok(jobs) => {
            let views: Vec<serde_json::Value> = jobs.iter().map(job_view).collect();
            Json(serde_json::json!({ "success": true, "analyses": views }))
        }
        Err(e) => Json(
            serde_json::json!({ "success": false, "error": format!("Database error: {}", e) }),
        ),
    }
}

pub async fn list_social_posts(
    Path(job_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let rec = match state.store.get_job(&job_id).await {
        Ok(Some(rec)) => rec,
        Ok(None) => {
            return Json(serde_json::json!({ "success": false, "error": "Analysis not found" }));
        }
        Err(e) => {
            return Json(
                serde_json::json!({ "success": false, "error": format!("Database error: {}", e) }),
            );
        }
    };

    if !owner_from_headers(&headers).is_some_and(|owner| owner == rec.owner_id) {
        return Json(serde_json::json!({ "success": false, "error": "Not authorized" }));
    }

    match state.store.list_social_posts(&job_id).await {
        Ok(posts) => Json(serde_json::json!({ "success": true, "posts": posts })),
        Err(e) => Json(
            serde_json::json!({ "success": false, "error": format!("Database error: {}", e) }),
        ),
    }
}
