//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Which optional capabilities are wired up
#[derive(Serialize)]
pub struct CapabilitiesResponse {
    pub microphone: bool,
    pub speech_recognition: bool,
    pub default_language: crate::LanguageMode,
    pub active_sessions: usize,
}

/// Liveness check
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Report input capabilities so a front-end can hide unusable controls
async fn capabilities(State(state): State<Arc<ApiState>>) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        microphone: state.microphone_enabled && state.input.is_some(),
        speech_recognition: state.input.is_some(),
        default_language: state.default_language,
        active_sessions: state.session_count(),
    })
}

/// Build health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/capabilities", get(capabilities))
        .with_state(state)
}
