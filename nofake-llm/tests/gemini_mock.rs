mod common;

use nofake_common::NofakeError;
use nofake_llm::gemini::GeminiClient;
use nofake_llm::openai::OpenAiClient;
use nofake_llm::traits::LlmClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-1.5-flash";

fn gemini(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key".to_string(), MODEL.to_string())
        .expect("client builds")
        .with_base_url(&server.uri())
        .expect("mock base url")
}

#[tokio::test]
async fn gemini_generate_returns_candidate_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}:generateContent")))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": { "parts": [{ "text": "sys" }] },
            "generationConfig": { "maxOutputTokens": 256, "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "```json\n{\"credibilityScore\": 81}" }, { "text": "\n```" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 99 }
        })))
        .mount(&server)
        .await;

    let resp = gemini(&server)
        .generate("analiza", Some("sys"), Some(256), Some(0.2))
        .await
        .expect("mocked generate");

    assert_eq!(resp.text, "```json\n{\"credibilityScore\": 81}\n```");
    assert_eq!(resp.tokens_used, Some(99));
    assert_eq!(resp.model.as_deref(), Some(MODEL));
}

#[tokio::test]
async fn gemini_safety_block_is_an_oracle_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let err = gemini(&server)
        .generate("x", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, NofakeError::Oracle(ref m) if m.contains("safety")));
}

#[tokio::test]
async fn gemini_http_errors_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = gemini(&server);
    let err = client.generate("x", None, None, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Oracle error: Rate limit exceeded");
    assert!(!client.health_check().await.unwrap());
}

#[tokio::test]
async fn gemini_plain_text_mode_omits_mime_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}:generateContent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "hola" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = gemini(&server).with_json_mode(false);
    let resp = client.generate("x", None, Some(32), None).await.unwrap();
    assert_eq!(resp.text, "hola");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 32);
    assert!(body["generationConfig"].get("responseMimeType").is_none());
}

#[tokio::test]
async fn openai_generate_joins_output_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "model": "gpt-4o-mini",
            "output": [{
                "type": "message",
                "content": [
                    { "type": "output_text", "text": "{\"citations\": []}" }
                ]
            }],
            "usage": { "total_tokens": 12 }
        })))
        .mount(&server)
        .await;

    let base = format!("{}/v1/", server.uri());
    let client = OpenAiClient::new("sk-test".into(), "gpt-4o-mini".into(), Some(&base)).unwrap();
    let resp = client.generate("cita", None, None, None).await.unwrap();
    assert_eq!(resp.text, "{\"citations\": []}");
    assert_eq!(resp.tokens_used, Some(12));
}
