//! Route handler functions.
//!
//! Page handlers render HTML and redirect to `/login` when the caller has no
//! session. The JSON handlers return `ApiError` on failure.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use solace_store::DashboardSnapshot;

use crate::auth::{self, CurrentUser};
use crate::error::ApiError;
use crate::pages::{self, ChatOutcome};
use crate::state::AppState;

/// Reply sent by `/get_response` to callers without a session. Delivered with
/// a 200 status; existing clients look for this text rather than a 401.
pub const UNAUTHORIZED_REPLY: &str = "Unauthorized. Please login first.";

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub user_input: String,
}

/// Body of `POST /get_response`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub transcript_len: usize,
    pub concerns_len: usize,
    pub active_sessions: usize,
}

// =============================================================================
// Public pages
// =============================================================================

/// GET / - landing page.
pub async fn index(user: CurrentUser) -> Html<String> {
    Html(pages::home(user.id().is_some()))
}

/// GET /about
pub async fn about(user: CurrentUser) -> Html<String> {
    Html(pages::about(user.id().is_some()))
}

/// GET /services
pub async fn services(user: CurrentUser) -> Html<String> {
    Html(pages::services(user.id().is_some()))
}

/// GET /health - liveness and store sizes.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.view.stats();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        transcript_len: stats.transcript_len,
        concerns_len: stats.concerns_len,
        active_sessions: state.sessions.active(),
    })
}

// =============================================================================
// Session lifecycle
// =============================================================================

/// GET /login - login form, with an error notice after a failed attempt.
pub async fn login_form(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(pages::login(query.error.is_some()))
}

/// POST /login - check credentials and open a session.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !auth::verify_credentials(&state.config.auth, &form.username, &form.password) {
        tracing::warn!(username = %form.username, "Login failed");
        return Redirect::to("/login?error=1").into_response();
    }

    let token = state.sessions.create(&form.username);
    tracing::info!(user = %form.username, "Login succeeded");
    (
        [(SET_COOKIE, auth::session_cookie(&token, state.sessions.ttl()))],
        Redirect::to("/dashboard"),
    )
        .into_response()
}

/// GET /logout - drop the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = auth::session_token(&headers) {
        if state.sessions.revoke(token) {
            tracing::info!("Session closed");
        }
    }
    (
        [(SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

// =============================================================================
// Chat
// =============================================================================

/// GET /chat - chat form.
pub async fn chat_page(user: CurrentUser) -> Response {
    match user.id() {
        Some(id) => Html(pages::chat(id, ChatOutcome::Empty)).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// POST /chat - run the pipeline on `user_input` and render the result.
pub async fn chat_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Response {
    let Some(user_id) = user.id() else {
        return Redirect::to("/login").into_response();
    };
    let message = form.map(|Form(f)| f.user_input).unwrap_or_default();

    match state.pipeline.exchange(Some(user_id), &message).await {
        Ok(entry) => Html(pages::chat(user_id, ChatOutcome::Answered(&entry))).into_response(),
        Err(err) => {
            let err = ApiError::from(err);
            (
                err.status(),
                Html(pages::chat(user_id, ChatOutcome::Failed(err.message()))),
            )
                .into_response()
        }
    }
}

/// POST /get_response - JSON chat endpoint.
pub async fn get_response(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Some(user_id) = user.id() else {
        return Ok(Json(ChatResponse {
            response: UNAUTHORIZED_REPLY.to_string(),
        }));
    };

    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let message = request
        .message
        .ok_or_else(|| ApiError::BadRequest("missing 'message' field".to_string()))?;

    let reply = state.pipeline.handle(Some(user_id), &message).await?;
    Ok(Json(ChatResponse { response: reply }))
}

// =============================================================================
// Dashboard
// =============================================================================

/// GET /dashboard - operator dashboard page.
pub async fn dashboard_page(State(state): State<AppState>, user: CurrentUser) -> Response {
    match user.id() {
        Some(id) => Html(pages::dashboard(id, &state.view.dashboard())).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// GET /api/dashboard - dashboard snapshot as JSON.
pub async fn api_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.view.dashboard())
}

/// GET /api/stream - store events as server-sent events.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>> + Send> {
    let rx = state.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => Event::default()
            .event(event.name())
            .json_data(&event)
            .ok()
            .map(Ok),
        // Lagged receivers skip what they missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Fallback for unknown paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html("<h1>Not found</h1>"))
}
