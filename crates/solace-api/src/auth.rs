//! Operator sessions.
//!
//! A login issues a random token stored in an `HttpOnly` cookie. The token
//! maps to a user id in an in-memory registry with a fixed lifetime. Handlers
//! see the caller only as [`CurrentUser`], an `Option` of that id.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use subtle::ConstantTimeEq;

use solace_core::config::AuthConfig;

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "solace_session";

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    expires_at: Instant,
}

/// Token to user id, with expiry.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session for `user_id` and return its token.
    pub fn create(&self, user_id: &str) -> String {
        let token = generate_token();
        let now = Instant::now();
        let mut sessions = self.lock();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                user_id: user_id.to_string(),
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// User id for `token`, if the session exists and has not expired.
    pub fn resolve(&self, token: &str) -> Option<String> {
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(session) if session.expires_at > Instant::now() => Some(session.user_id.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Drop the session for `token`. Returns whether one existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    /// Number of live sessions.
    pub fn active(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|s| s.expires_at > now).count()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Check submitted credentials against the configured operator account.
pub fn verify_credentials(config: &AuthConfig, username: &str, password: &str) -> bool {
    // Both comparisons always run so timing does not reveal which one failed.
    let user_ok = config.username.as_bytes().ct_eq(username.as_bytes());
    let pass_ok = config.password.as_bytes().ct_eq(password.as_bytes());
    bool::from(user_ok & pass_ok)
}

/// Value of the session cookie in `headers`, if present.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value that stores `token`.
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.as_secs()
    )
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// The authenticated caller, or `None` when there is no live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub Option<String>);

impl CurrentUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = session_token(&parts.headers).and_then(|token| state.sessions.resolve(token));
        Ok(CurrentUser(user))
    }
}

/// Middleware for the JSON dashboard routes: 401 without a live session.
pub async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let authenticated = session_token(req.headers())
        .and_then(|token| state.sessions.resolve(token))
        .is_some();

    if authenticated {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": "Please login first."
        })),
    )
        .into_response()
}
