//! HTTP behaviour of the completion client against a mock service.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use charsmith_llm::{BlockingClient, LlmClient, LlmError, LlmSettings, TextGenerator};

fn settings(server: &MockServer) -> LlmSettings {
    LlmSettings::new("sk-test", "gpt-4")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(5))
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4-0613",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 40, "completion_tokens": 12 }
    })
}

#[tokio::test]
async fn chat_returns_message_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("{\"name\": \"Thalanil\"}")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(settings(&server)).expect("client");
    let response = client
        .generate(&client.request("Create a character"))
        .await
        .expect("generate");
    assert_eq!(response.text, "{\"name\": \"Thalanil\"}");
    assert_eq!(response.tokens_generated, 12);
    assert_eq!(response.model, "gpt-4-0613");
}

#[tokio::test]
async fn request_sends_system_and_user_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": charsmith_llm::prompt::SYSTEM_PROMPT },
                { "role": "user", "content": "List equipment" }
            ],
            "max_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[\"Rope\"]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(settings(&server)).expect("client");
    assert_eq!(client.chat("List equipment").await.expect("chat"), "[\"Rope\"]");
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = LlmClient::new(settings(&server)).expect("client");
    match client.chat("hello").await {
        Err(LlmError::Http { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let client = LlmClient::new(settings(&server)).expect("client");
    assert!(matches!(client.chat("hello").await, Err(LlmError::EmptyResponse)));
}

#[tokio::test]
async fn non_completion_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = LlmClient::new(settings(&server)).expect("client");
    assert!(matches!(client.chat("hello").await, Err(LlmError::ParseError(_))));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = LlmClient::new(settings(&server).with_timeout(Duration::from_millis(200)))
        .expect("client");
    let err = client.chat("hello").await.expect_err("timeout");
    assert!(matches!(err, LlmError::Timeout(limit) if limit == Duration::from_millis(200)));
    assert_eq!(err.to_string(), "LLM request timed out after 200ms");
}

#[test]
fn blocking_client_completes_outside_a_runtime() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let server = runtime.block_on(MockServer::start());
    runtime.block_on(
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion("{\"background\": \"b\"}")),
            )
            .expect(1)
            .mount(&server),
    );

    let client = BlockingClient::new(settings(&server)).expect("client");
    assert_eq!(client.complete("story").expect("complete"), "{\"background\": \"b\"}");
    drop(client);
    runtime.block_on(server.verify());
}
