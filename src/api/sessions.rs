//! Conversation session endpoints
//!
//! Every action responds with the [`ChatView`] to render next. Notices in
//! that view (farewell, "not understood", adapter errors) are not stored and
//! will not appear on the following `GET`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::ApiState;
use crate::conversation::ConversationState;
use crate::locale;
use crate::view::{ChatView, Notice};
use crate::{Error, LanguageMode};

/// Build session router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(show).delete(remove))
        .route("/{id}/language", post(toggle_language))
        .route("/{id}/utterance", post(submit_text))
        .route("/{id}/audio", post(submit_audio))
        .route("/{id}/record", post(record))
        .route("/{id}/continue", post(continue_conversation))
        .route("/{id}/end", post(end_conversation))
        .with_state(state)
}

/// Optional body for session creation
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub language: Option<LanguageMode>,
}

/// Created session
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub id: Uuid,
    pub view: ChatView,
}

/// Typed utterance
#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
}

/// Start a new session
async fn create(
    State(state): State<Arc<ApiState>>,
    body: Option<Json<CreateSessionRequest>>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let language = body
        .and_then(|Json(req)| req.language)
        .unwrap_or(state.default_language);

    let id = Uuid::new_v4();
    let conversation = ConversationState::new(language);
    let view = ChatView::render(&conversation);

    state
        .sessions
        .insert(id, Arc::new(Mutex::new(conversation)));

    tracing::info!(session = %id, %language, "session created");
    (StatusCode::CREATED, Json(CreateSessionResponse { id, view }))
}

/// Current view of a session
async fn show(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, ApiError> {
    let session = state.session(id)?;
    let conversation = session.lock().await;
    Ok(Json(ChatView::render(&conversation)))
}

/// Drop a session
async fn remove(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.session(id)?;
    state.sessions.invalidate(&id);

    tracing::info!(session = %id, "session removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Switch language, abandoning any turn in progress
async fn toggle_language(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, ApiError> {
    let session = state.session(id)?;
    let mut conversation = session.lock().await;
    state.turns.toggle_language(&mut conversation);
    Ok(Json(ChatView::render(&conversation)))
}

/// Submit typed text
async fn submit_text(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UtteranceRequest>,
) -> Result<Json<ChatView>, ApiError> {
    let session = state.session(id)?;
    let mut conversation = session.lock().await;

    let outcome = state
        .turns
        .submit_utterance(&mut conversation, &request.text)
        .await?;

    Ok(Json(ChatView::with_notices(
        &conversation,
        Notice::for_outcome(&outcome),
    )))
}

/// Submit recorded audio (WAV body)
async fn submit_audio(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ChatView>, ApiError> {
    let input = state
        .input
        .clone()
        .ok_or(ApiError::NotConfigured("speech recognition not configured"))?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty audio data".to_string()));
    }

    let session = state.session(id)?;
    let mut conversation = session.lock().await;
    let bundle = locale::resolve(conversation.language_mode);

    let transcript = input.recognize_wav(&body, bundle.recognizer_locale).await;
    respond_to_transcript(&state, &mut conversation, transcript).await
}

/// Record from the server's microphone
async fn record(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, ApiError> {
    let input = state
        .input
        .clone()
        .filter(|_| state.microphone_enabled)
        .ok_or(ApiError::NotConfigured("microphone input not available"))?;

    let session = state.session(id)?;
    let mut conversation = session.lock().await;
    let bundle = locale::resolve(conversation.language_mode);

    let transcript = input.listen(bundle.recognizer_locale).await;
    respond_to_transcript(&state, &mut conversation, transcript).await
}

/// Run a turn for a recognized transcript, or explain why none ran
async fn respond_to_transcript(
    state: &ApiState,
    conversation: &mut ConversationState,
    transcript: crate::Result<String>,
) -> Result<Json<ChatView>, ApiError> {
    let bundle = locale::resolve(conversation.language_mode);

    let transcript = match transcript {
        Ok(text) if text.is_empty() => {
            return Ok(Json(ChatView::with_notices(
                conversation,
                vec![Notice::not_understood(bundle)],
            )));
        }
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "listening failed");
            return Ok(Json(ChatView::with_notices(
                conversation,
                vec![Notice::listen_error(bundle, &e.to_string())],
            )));
        }
    };

    let outcome = state.turns.submit_utterance(conversation, &transcript).await?;
    Ok(Json(ChatView::with_notices(
        conversation,
        Notice::for_outcome(&outcome),
    )))
}

/// Ask another question
async fn continue_conversation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, ApiError> {
    let session = state.session(id)?;
    let mut conversation = session.lock().await;
    state.turns.continue_conversation(&mut conversation)?;
    Ok(Json(ChatView::render(&conversation)))
}

/// End the conversation and show the farewell once
async fn end_conversation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, ApiError> {
    let session = state.session(id)?;
    let mut conversation = session.lock().await;
    state.turns.end_conversation(&mut conversation)?;

    let bundle = locale::resolve(conversation.language_mode);
    Ok(Json(ChatView::with_notices(
        &conversation,
        vec![Notice::farewell(bundle)],
    )))
}

/// Session API errors
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    NotConfigured(&'static str),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::SessionNotFound(_) => Self::NotFound(e.to_string()),
            Error::InvalidTransition { .. } => Self::Conflict(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "invalid_transition", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_configured",
                msg.to_string(),
            ),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        (status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
    }
}
