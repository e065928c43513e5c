//! Solace API crate - axum HTTP server, pages, sessions, SSE streaming.
//!
//! Serves the public pages, the session lifecycle (login/logout), the chat
//! routes that drive the session pipeline, and the operator dashboard with
//! its JSON and live-stream variants.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
