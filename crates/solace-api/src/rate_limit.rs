//! Fixed-window request limiter for the chat routes.
//!
//! Counts requests per wall-clock second with two atomics. Applied as an axum
//! middleware with the limiter passed in an `Extension`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Extension, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use solace_core::config::ServerConfig;

/// Shared limiter state. Clones share the same window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_per_sec: u64,
    count: Arc<AtomicU64>,
    window: Arc<AtomicU64>,
}

impl RateLimiter {
    /// Allow `max_per_sec` requests per second. Zero disables the limit.
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec,
            count: Arc::new(AtomicU64::new(0)),
            window: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.rate_limit_per_sec)
    }

    pub fn max_per_sec(&self) -> u64 {
        self.max_per_sec
    }

    /// Take a permit for the current second.
    pub fn try_acquire(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.try_acquire_at(now)
    }

    fn try_acquire_at(&self, second: u64) -> bool {
        if self.max_per_sec == 0 {
            return true;
        }

        let current = self.window.load(Ordering::Acquire);
        if second > current
            && self
                .window
                .compare_exchange(current, second, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            // This request opened the window.
            self.count.store(1, Ordering::Release);
            return true;
        }

        self.count.fetch_add(1, Ordering::AcqRel) < self.max_per_sec
    }
}

/// Axum middleware that enforces the limit.
pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "Rate limit exceeded");
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "error": "too_many_requests",
            "message": "Rate limit exceeded"
        })),
    )
        .into_response()
}
