//! HTTP API server for voicechat
//!
//! Each session owns one [`ConversationState`] behind its own mutex. The
//! mutex is held for a whole action, so a session never runs two turns at
//! once while separate sessions proceed independently. Sessions nobody
//! touches for the configured idle time are dropped.

pub mod health;
pub mod sessions;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use mini_moka::sync::Cache;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::DEFAULT_SESSION_IDLE;
use crate::conversation::ConversationState;
use crate::input::MicrophoneInput;
use crate::locale::LanguageMode;
use crate::turn::TurnController;
use crate::{Error, Result};

/// Upper bound on live sessions; least recently used go first
const MAX_SESSIONS: u64 = 10_000;

/// Live sessions keyed by ID, expiring after an idle period
pub type SessionStore = Cache<Uuid, Arc<Mutex<ConversationState>>>;

fn session_store(idle: Duration) -> SessionStore {
    Cache::builder()
        .max_capacity(MAX_SESSIONS)
        .time_to_idle(idle)
        .build()
}

/// Shared state for API handlers
pub struct ApiState {
    pub turns: Arc<TurnController>,
    /// Recognition for uploaded audio and the server microphone
    pub input: Option<Arc<MicrophoneInput>>,
    /// Whether the server's own microphone may be used
    pub microphone_enabled: bool,
    pub default_language: LanguageMode,
    pub sessions: SessionStore,
}

impl ApiState {
    #[must_use]
    pub fn new(
        turns: Arc<TurnController>,
        input: Option<Arc<MicrophoneInput>>,
        microphone_enabled: bool,
        default_language: LanguageMode,
    ) -> Self {
        Self {
            turns,
            input,
            microphone_enabled,
            default_language,
            sessions: session_store(DEFAULT_SESSION_IDLE),
        }
    }

    /// Replace the session store with one that expires after `idle`
    #[must_use]
    pub fn with_session_idle(mut self, idle: Duration) -> Self {
        self.sessions = session_store(idle);
        self
    }

    /// Number of live sessions
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.iter().count()
    }

    /// Look up a session by ID, refreshing its idle timer
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if no such session exists or it expired
    pub fn session(&self, id: Uuid) -> Result<Arc<Mutex<ConversationState>>> {
        self.sessions
            .get(&id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }
}

/// HTTP server wrapping the session API
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Build the router with all routes and layers
    pub fn router(&self) -> Router {
        let router = Router::new()
            .nest("/api/sessions", sessions::router(self.state.clone()))
            .merge(health::router(self.state.clone()));

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server until it fails
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::MutedOutput;

    struct Echo;

    #[async_trait::async_trait]
    impl crate::completion::CompletionClient for Echo {
        async fn complete(&self, _system_prompt: &str, user_message: &str) -> Result<String> {
            Ok(user_message.to_string())
        }
    }

    fn state(idle: Duration) -> ApiState {
        let turns = Arc::new(TurnController::new(Arc::new(Echo), Arc::new(MutedOutput)));
        ApiState::new(turns, None, false, LanguageMode::Urdu).with_session_idle(idle)
    }

    #[test]
    fn test_idle_session_expires() {
        let state = state(Duration::from_millis(50));
        let id = Uuid::new_v4();
        state
            .sessions
            .insert(id, Arc::new(Mutex::new(ConversationState::default())));

        assert!(state.session(id).is_ok());
        assert_eq!(state.session_count(), 1);

        std::thread::sleep(Duration::from_millis(150));

        assert!(matches!(state.session(id), Err(Error::SessionNotFound(_))));
        assert_eq!(state.session_count(), 0);
    }

    #[test]
    fn test_lookup_refreshes_idle_timer() {
        let state = state(Duration::from_millis(300));
        let id = Uuid::new_v4();
        state
            .sessions
            .insert(id, Arc::new(Mutex::new(ConversationState::default())));

        for _ in 0..4 {
            std::thread::sleep(Duration::from_millis(100));
            assert!(state.session(id).is_ok());
        }
    }
}
