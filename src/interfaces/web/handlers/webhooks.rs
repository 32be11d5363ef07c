use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use tracing::info;

use super::super::AppState;
use crate::core::intake::MeetingSource;

/// Inbound meeting-provider events. The acknowledgment goes back as soon as
/// admission decides; the pipeline (if launched) continues on its own task.
pub async fn webhook_endpoint(
    Path(provider): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Json<serde_json::Value> {
    let slug = provider.trim().to_lowercase();
    let Some(source) = MeetingSource::from_slug(&slug).filter(|s| *s != MeetingSource::Upload)
    else {
        return Json(serde_json::json!({ "success": false, "error": "Unknown webhook provider" }));
    };

    // Fail closed when a signing secret is configured for this provider.
    if let Some(secret) = state.config.webhook_secrets.get(&slug)
        && !verify_webhook_signature(&headers, &body, secret)
    {
        return Json(
            serde_json::json!({ "success": false, "error": "Signature verification failed" }),
        );
    }

    info!("Verified inbound webhook from {}", slug);
    let outcome = state.intake.trigger_webhook(source, &body).await;

    Json(serde_json::json!({
        "success": outcome.success,
        "correlation_id": outcome.correlation_id,
        "job_id": outcome.job_id,
        "error": outcome.error,
    }))
}

/// Verify webhook signature against the patterns our providers use.
/// Supports: Zoom (x-zm-signature: v0=<hex> over "v0:{ts}:{body}") and
/// generic (x-signature: raw HMAC-SHA256 hex over the body).
fn verify_webhook_signature(headers: &HeaderMap, body: &str, secret: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    // Zoom: x-zm-signature: v0=<hex>, x-zm-request-timestamp: <ts>
    if let (Some(sig), Some(ts)) = (
        headers.get("x-zm-signature").and_then(|v| v.to_str().ok()),
        headers
            .get("x-zm-request-timestamp")
            .and_then(|v| v.to_str().ok()),
    ) && let Some(hex_sig) = sig.strip_prefix("v0=")
    {
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(format!("v0:{}:{}", ts, body).as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());
        return constant_time_eq(hex_sig.as_bytes(), expected.as_bytes());
    }

    // Generic fallback: x-signature header as raw HMAC-SHA256 hex
    if let Some(sig) = headers.get("x-signature").and_then(|v| v.to_str().ok()) {
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(body.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());
        return constant_time_eq(sig.as_bytes(), expected.as_bytes());
    }

    // No recognized signature header found - fail closed
    false
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
