//! Signed, time-boxed access tokens embedded in outcome notifications.
//!
//! The token binds job id, recipient, and an expiry instant under
//! HMAC-SHA256, so the "view analysis" link in a notification can be checked
//! without a session and without consulting the orchestrator. Format:
//! `hex(recipient).expires_at.hex(mac)`.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn sign(secret: &str, job_id: &str, recipient: &str, expires_at: u64) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}.{}.{}", job_id, recipient, expires_at).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub fn issue(secret: &str, job_id: &str, recipient: &str, ttl_secs: u64) -> String {
    let expires_at = now_secs().saturating_add(ttl_secs);
    let mac = sign(secret, job_id, recipient, expires_at).unwrap_or_default();
    format!("{}.{}.{}", hex::encode(recipient.as_bytes()), expires_at, mac)
}

/// Check a token against a job id. Returns the recipient it was issued to
/// when the signature matches and the token has not expired.
pub fn verify(secret: &str, job_id: &str, token: &str) -> Option<String> {
    let mut parts = token.splitn(3, '.');
    let recipient_hex = parts.next()?;
    let expires_at: u64 = parts.next()?.parse().ok()?;
    let mac = parts.next()?;

    if now_secs() >= expires_at {
        return None;
    }

    let recipient = String::from_utf8(hex::decode(recipient_hex).ok()?).ok()?;
    let expected = sign(secret, job_id, &recipient, expires_at)?;
    if constant_time_eq(mac.as_bytes(), expected.as_bytes()) {
        Some(recipient)
    } else {
        None
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_returns_recipient() {
        let token = issue("secret", "job-1", "owner@example.com", 60);
        assert_eq!(
            verify("secret", "job-1", &token).as_deref(),
            Some("owner@example.com")
        );
    }

    #[test]
    fn rejects_wrong_job_and_wrong_secret() {
        let token = issue("secret", "job-1", "owner@example.com", 60);
        assert!(verify("secret", "job-2", &token).is_none());
        assert!(verify("other-secret", "job-1", &token).is_none());
    }

    #[test]
    fn rejects_expired_token() {
        let token = issue("secret", "job-1", "owner@example.com", 0);
        assert!(verify("secret", "job-1", &token).is_none());
    }

    #[test]
    fn rejects_tampered_expiry() {
        let token = issue("secret", "job-1", "owner@example.com", 60);
        let mut parts: Vec<&str> = token.splitn(3, '.').collect();
        let bumped = format!("{}", u64::MAX);
        parts[1] = &bumped;
        assert!(verify("secret", "job-1", &parts.join(".")).is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(verify("secret", "job-1", "not-a-token").is_none());
        assert!(verify("secret", "job-1", "").is_none());
    }
}
