//! Router setup with all routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, body limits,
//! the chat rate limiter and the session gate on the JSON dashboard routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use solace_core::config::ServerConfig;
use solace_core::SolaceError;

use crate::handlers;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;

/// Origins allowed to call the API from a browser: the configured host plus
/// the loopback aliases, all on the configured port.
fn allowed_origins(server: &ServerConfig) -> Vec<HeaderValue> {
    let mut origins: Vec<String> = Vec::with_capacity(3);
    for host in [server.host.as_str(), "127.0.0.1", "localhost"] {
        let origin = format!("http://{}:{}", host, server.port);
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect()
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let server = &config.server;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins(server)))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    // Pages and session lifecycle. Page handlers do their own redirects.
    let public_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/about", get(handlers::about))
        .route("/services", get(handlers::services))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/health", get(handlers::health));

    // Chat routes call the model adapters, so they are rate limited.
    let limiter = RateLimiter::from_config(server);
    let chat_routes = Router::new()
        .route("/chat", get(handlers::chat_page).post(handlers::chat_submit))
        .route("/get_response", post(handlers::get_response))
        .layer(axum::middleware::from_fn(
            crate::rate_limit::rate_limit_middleware,
        ))
        .layer(axum::Extension(limiter));

    // JSON dashboard and live stream, behind the session gate.
    let api_routes = Router::new()
        .route("/api/dashboard", get(handlers::api_dashboard))
        .route("/api/stream", get(handlers::stream))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_session,
        ));

    public_routes
        .merge(chat_routes)
        .merge(api_routes)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn start_server(state: AppState) -> Result<(), SolaceError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SolaceError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SolaceError::Api(format!("Server error: {}", e)))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
