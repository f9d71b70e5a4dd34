//! Chat completion client tests against a mock HTTP server

use secrecy::SecretString;
use voicechat::config::CompletionConfig;
use voicechat::{ChatCompletionClient, CompletionClient, Error};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChatCompletionClient {
    let config = CompletionConfig {
        api_key: Some(SecretString::from("sk-test")),
        endpoint: format!("{}/api/v1/chat/completions", server.uri()),
        model: "openai/gpt-3.5-turbo".to_string(),
        temperature: 0.7,
        timeout_secs: 5,
    };
    ChatCompletionClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_complete_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "openai/gpt-3.5-turbo",
            "messages": [
                { "role": "system", "content": "Answer in English." },
                { "role": "user", "content": "What is 2 + 2?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "2 + 2 is 4." } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .complete("Answer in English.", "What is 2 + 2?")
        .await
        .unwrap();

    assert_eq!(reply, "2 + 2 is 4.");
}

#[tokio::test]
async fn test_server_error_is_completion_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("p", "q").await.unwrap_err();

    assert!(matches!(&err, Error::Completion(msg) if msg.contains("500")));
}

#[tokio::test]
async fn test_malformed_body_is_completion_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("p", "q").await.unwrap_err();

    assert!(matches!(err, Error::Completion(_)));
}

#[tokio::test]
async fn test_empty_choices_is_completion_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).complete("p", "q").await.unwrap_err();

    assert!(matches!(err, Error::Completion(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_completion_error() {
    let config = CompletionConfig {
        api_key: Some(SecretString::from("sk-test")),
        endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        timeout_secs: 2,
        ..CompletionConfig::default()
    };
    let client = ChatCompletionClient::new(&config).unwrap();

    let err = client.complete("p", "q").await.unwrap_err();

    assert!(matches!(err, Error::Completion(_)));
}
