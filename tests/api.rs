//! Session API integration tests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use voicechat::api::{ApiServer, ApiState};
use voicechat::voice::ListenWindow;
use voicechat::{LanguageMode, MicrophoneInput, SpeechRecognizer, TurnController};

mod common;
use common::{FixedRecognizer, RecordingSpeech, ScriptedCompletion};

/// Build a test API router
fn build_test_router(
    completion: Arc<ScriptedCompletion>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
) -> axum::Router {
    let turns = Arc::new(TurnController::new(completion, RecordingSpeech::new()));
    let input = recognizer.map(|r| Arc::new(MicrophoneInput::new(r, ListenWindow::default())));

    let state = Arc::new(ApiState::new(turns, input, false, LanguageMode::Urdu));
    ApiServer::new(state, 0).router()
}

/// Build a router whose sessions expire after `idle`
fn build_expiring_router(idle: Duration) -> axum::Router {
    let turns = Arc::new(TurnController::new(
        ScriptedCompletion::replying("hi"),
        RecordingSpeech::new(),
    ));
    let state =
        Arc::new(ApiState::new(turns, None, false, LanguageMode::Urdu).with_session_idle(idle));
    ApiServer::new(state, 0).router()
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn create_session(app: &axum::Router, body: Option<serde_json::Value>) -> String {
    let (status, json) = send(app, "POST", "/api/sessions", body).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_capabilities_without_recognizer() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    create_session(&app, None).await;

    let (status, json) = send(&app, "GET", "/api/capabilities", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["microphone"], false);
    assert_eq!(json["speech_recognition"], false);
    assert_eq!(json["default_language"], "urdu");
    assert_eq!(json["active_sessions"], 1);
}

#[tokio::test]
async fn test_new_session_is_idle_in_default_language() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);

    let (status, json) = send(&app, "POST", "/api/sessions", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["id"].is_string());
    assert_eq!(json["view"]["language"], "urdu");
    assert_eq!(json["view"]["phase"], "idle");
    assert_eq!(json["view"]["strings"]["voice"], "ur-PK-UzmaNeural");
    assert_eq!(json["view"]["bubbles"], serde_json::json!([]));
}

#[tokio::test]
async fn test_new_session_with_language() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);

    let (_, json) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(serde_json::json!({ "language": "english" })),
    )
    .await;

    assert_eq!(json["view"]["language"], "english");
    assert_eq!(json["view"]["strings"]["continue_label"], "Yes, ask another question");
}

#[tokio::test]
async fn test_utterance_full_turn() {
    let completion = ScriptedCompletion::replying("Paris is the capital of France.");
    let app = build_test_router(completion.clone(), None);
    let id = create_session(&app, Some(serde_json::json!({ "language": "english" }))).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/utterance"),
        Some(serde_json::json!({ "text": "  What is the capital of France?  " })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "awaiting_decision");
    assert_eq!(json["awaiting_continue_decision"], true);
    assert_eq!(json["bubbles"][0]["speaker"], "user");
    assert_eq!(json["bubbles"][0]["text"], "What is the capital of France?");
    assert_eq!(json["bubbles"][1]["speaker"], "bot");
    assert_eq!(json["bubbles"][1]["text"], "Paris is the capital of France.");

    let calls = completion.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.contains("English"));
    assert_eq!(calls[0].1, "What is the capital of France?");
}

#[tokio::test]
async fn test_empty_utterance_is_ignored() {
    let completion = ScriptedCompletion::replying("unused");
    let app = build_test_router(completion.clone(), None);
    let id = create_session(&app, None).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/utterance"),
        Some(serde_json::json!({ "text": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "idle");
    assert!(completion.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_completion_failure_shows_fallback() {
    let app = build_test_router(ScriptedCompletion::failing(), None);
    let id = create_session(&app, None).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/utterance"),
        Some(serde_json::json!({ "text": "سلام" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bubbles"][1]["text"], "معذرت، میں ابھی جواب نہیں دے پا رہی");
    assert_eq!(json["awaiting_continue_decision"], true);
}

#[tokio::test]
async fn test_continue_while_idle_conflicts() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = create_session(&app, None).await;

    let (status, json) = send(&app, "POST", &format!("/api/sessions/{id}/continue"), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "invalid_transition");
}

#[tokio::test]
async fn test_second_utterance_while_awaiting_conflicts() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = create_session(&app, None).await;
    let uri = format!("/api/sessions/{id}/utterance");

    send(&app, "POST", &uri, Some(serde_json::json!({ "text": "one" }))).await;
    let (status, _) = send(&app, "POST", &uri, Some(serde_json::json!({ "text": "two" }))).await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_continue_clears_turn() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = create_session(&app, None).await;

    send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/utterance"),
        Some(serde_json::json!({ "text": "hello" })),
    )
    .await;
    let (status, json) = send(&app, "POST", &format!("/api/sessions/{id}/continue"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["bubbles"], serde_json::json!([]));
}

#[tokio::test]
async fn test_end_shows_farewell_once() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = create_session(&app, Some(serde_json::json!({ "language": "english" }))).await;

    send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/utterance"),
        Some(serde_json::json!({ "text": "hello" })),
    )
    .await;
    let (status, json) = send(&app, "POST", &format!("/api/sessions/{id}/end"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["notices"][0]["kind"], "success");
    assert_eq!(json["notices"][0]["message"], "Goodbye! It was nice talking to you.");

    let (_, json) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(json["notices"], serde_json::json!([]));
}

#[tokio::test]
async fn test_toggle_language_abandons_turn() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = create_session(&app, None).await;

    send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/utterance"),
        Some(serde_json::json!({ "text": "hello" })),
    )
    .await;
    let (status, json) = send(&app, "POST", &format!("/api/sessions/{id}/language"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["language"], "english");
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["strings"]["switch_language_label"], "اردو میں تبدیل کریں");
}

#[tokio::test]
async fn test_unknown_session_not_found() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = uuid::Uuid::new_v4();

    let (status, json) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = create_session(&app, None).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_audio_without_recognizer_unavailable() {
    let app = build_test_router(ScriptedCompletion::replying("hi"), None);
    let id = create_session(&app, None).await;

    let (status, json) = send(&app, "POST", &format!("/api/sessions/{id}/audio"), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "not_configured");

    let (status, _) = send(&app, "POST", &format!("/api/sessions/{id}/record"), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_audio_upload_runs_turn_in_session_locale() {
    let recognizer = FixedRecognizer::hearing(" آج موسم کیسا ہے؟ ");
    let completion = ScriptedCompletion::replying("آج موسم خوشگوار ہے۔");
    let app = build_test_router(completion.clone(), Some(recognizer.clone()));
    let id = create_session(&app, None).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/sessions/{id}/audio"))
                .header("Content-Type", "audio/wav")
                .body(Body::from(vec![1_u8; 64]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["bubbles"][0]["text"], "آج موسم کیسا ہے؟");
    assert_eq!(json["bubbles"][1]["text"], "آج موسم خوشگوار ہے۔");
    assert_eq!(*recognizer.locales.lock().unwrap(), vec!["ur-PK".to_string()]);
    assert_eq!(completion.calls.lock().unwrap()[0].1, "آج موسم کیسا ہے؟");
}

#[tokio::test]
async fn test_audio_recognition_failure_is_notice() {
    let app = build_test_router(
        ScriptedCompletion::replying("hi"),
        Some(FixedRecognizer::failing()),
    );
    let id = create_session(&app, Some(serde_json::json!({ "language": "english" }))).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/sessions/{id}/audio"))
                .body(Body::from(vec![1_u8; 64]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["phase"], "idle");
    assert_eq!(json["notices"][0]["kind"], "error");
    assert!(
        json["notices"][0]["message"]
            .as_str()
            .unwrap()
            .starts_with("Listening error: ")
    );
}

#[tokio::test]
async fn test_audio_not_understood_is_notice() {
    let app = build_test_router(
        ScriptedCompletion::replying("hi"),
        Some(FixedRecognizer::hearing("")),
    );
    let id = create_session(&app, Some(serde_json::json!({ "language": "english" }))).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/sessions/{id}/audio"))
                .body(Body::from(vec![1_u8; 64]))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["phase"], "idle");
    assert_eq!(json["notices"][0]["kind"], "warning");
    assert_eq!(
        json["notices"][0]["message"],
        "Audio not understood, please try again"
    );
}

#[tokio::test]
async fn test_idle_session_answers_not_found() {
    let app = build_expiring_router(Duration::from_millis(100));
    let id = create_session(&app, None).await;

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let (status, json) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");

    let (_, json) = send(&app, "GET", "/api/capabilities", None).await;
    assert_eq!(json["active_sessions"], 0);
}
