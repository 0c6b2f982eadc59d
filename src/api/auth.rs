//! Admin session authentication.
//!
//! Opaque session tokens tracked server-side with an expiry, issued
//! against a configured shared password. Tokens carry no decodable
//! payload; validity means "present in the session table and not yet
//! expired". The password is held only as a SHA-256 digest.

use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::state::AppState;
use super::ApiError;

/// Issues and validates admin session tokens.
pub struct AdminAuth {
    password_digest: String,
    ttl: Duration,
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AdminAuth {
    /// An empty password disables authentication entirely.
    pub fn new(password: &str, ttl_hours: i64) -> Self {
        let digest = if password.is_empty() {
            String::new()
        } else {
            hex::encode(Sha256::digest(password.as_bytes()))
        };
        Self {
            password_digest: digest,
            ttl: Duration::hours(ttl_hours),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.password_digest.is_empty()
    }

    /// Check the password; on a match issue a fresh session token.
    pub async fn authenticate(&self, password: &str) -> Option<String> {
        if !self.enabled() {
            return None;
        }
        let attempt = hex::encode(Sha256::digest(password.as_bytes()));
        if attempt != self.password_digest {
            return None;
        }

        let token = Uuid::new_v4().to_string();
        let expires = Utc::now() + self.ttl;
        self.sessions.lock().await.insert(token.clone(), expires);
        info!("Issued admin session expiring at {}", expires);
        Some(token)
    }

    /// True when the token names a live session. Expired sessions are
    /// pruned as a side effect.
    pub async fn validate(&self, token: &str) -> bool {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, expires| *expires > now);
        sessions.contains_key(token)
    }

    /// Drop a session, e.g. on logout.
    pub async fn revoke(&self, token: &str) {
        if self.sessions.lock().await.remove(token).is_some() {
            debug!("Revoked admin session");
        }
    }

    #[cfg(test)]
    pub async fn expire_all(&self) {
        let past = Utc::now() - Duration::hours(1);
        for expires in self.sessions.lock().await.values_mut() {
            *expires = past;
        }
    }
}

/// Extractor guarding admin-gated handlers.
///
/// Requires `Authorization: Bearer <token>` naming a live session.
pub struct AdminSession;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        if state.auth.validate(token).await {
            Ok(AdminSession)
        } else {
            Err(ApiError::Unauthorized(
                "invalid or expired session".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_authenticate_good_password() {
        let auth = AdminAuth::new("hunter2", 24);
        let token = auth.authenticate("hunter2").await.unwrap();
        assert!(auth.validate(&token).await);
    }

    #[tokio::test]
    async fn test_authenticate_bad_password() {
        let auth = AdminAuth::new("hunter2", 24);
        assert!(auth.authenticate("wrong").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_password_disables_auth() {
        let auth = AdminAuth::new("", 24);
        assert!(!auth.enabled());
        assert!(auth.authenticate("").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_invalid() {
        let auth = AdminAuth::new("hunter2", 24);
        assert!(!auth.validate("nope").await);
    }

    #[tokio::test]
    async fn test_expired_session_rejected_and_pruned() {
        let auth = AdminAuth::new("hunter2", 24);
        let token = auth.authenticate("hunter2").await.unwrap();
        auth.expire_all().await;
        assert!(!auth.validate(&token).await);
        assert!(auth.sessions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_revoke() {
        let auth = AdminAuth::new("hunter2", 24);
        let token = auth.authenticate("hunter2").await.unwrap();
        auth.revoke(&token).await;
        assert!(!auth.validate(&token).await);
    }
}
