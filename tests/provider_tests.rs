//! OpenAI-compatible provider tests against a local mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use miki::agent::Agent;
use miki::config::ModelEndpointConfig;
use miki::error::MikiError;
use miki::provider::{ModelProvider, OpenAiProvider, ProviderRequest, ToolDefinition};
use miki::tools::Context;
use miki::types::*;

fn provider_for(server: &MockServer, timeout: Duration) -> OpenAiProvider {
    OpenAiProvider::new("moonshot-v1-8k", "test-key", Some(server.uri()), timeout).unwrap()
}

fn simple_request() -> ProviderRequest {
    ProviderRequest {
        messages: vec![ModelMessage::system("Be brief."), ModelMessage::user("hi")],
        settings: GenerationSettings::builder().temperature(0.5).build(),
        tools: None,
    }
}

fn completion(message: serde_json::Value, finish_reason: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": message, "finish_reason": finish_reason}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    })
}

#[tokio::test]
async fn text_completion_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "moonshot-v1-8k",
            "temperature": 0.5,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            json!({"role": "assistant", "content": "Hello!"}),
            "stop",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider_for(&server, Duration::from_secs(5))
        .generate_text(&simple_request())
        .await
        .unwrap();

    assert_eq!(response.text, "Hello!");
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.input_tokens, 12);
    assert_eq!(response.usage.output_tokens, 3);
    assert_eq!(response.usage.total_tokens, 15);
    assert!(response.tool_calls.is_empty());
}

#[tokio::test]
async fn tool_calls_are_parsed_and_tools_advertised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "tools": [{"type": "function", "function": {"name": "get_weather_for_location"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "get_weather_for_location",
                        "arguments": "{\"location\":\"Paris\"}"
                    }
                }]
            }),
            "tool_calls",
        )))
        .mount(&server)
        .await;

    let mut request = simple_request();
    request.tools = Some(vec![ToolDefinition {
        name: "get_weather_for_location".into(),
        description: "Get the weather".into(),
        parameters: json!({"type": "object", "properties": {}}),
    }]);

    let response = provider_for(&server, Duration::from_secs(5))
        .generate_text(&request)
        .await
        .unwrap();

    assert_eq!(response.text, "");
    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_1");
    assert_eq!(response.tool_calls[0].arguments, json!({"location": "Paris"}));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = provider_for(&server, Duration::from_secs(5))
        .generate_text(&simple_request())
        .await
        .unwrap_err();

    assert!(matches!(err, MikiError::Authentication(ref body) if body.contains("invalid api key")));
}

#[tokio::test]
async fn rate_limit_and_server_errors_are_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"error": {"message": "slow down", "retry_after": 2}})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Duration::from_secs(5));

    let err = provider.generate_text(&simple_request()).await.unwrap_err();
    assert!(matches!(err, MikiError::RateLimited { retry_after_ms: Some(2000) }));

    let err = provider.generate_text(&simple_request()).await.unwrap_err();
    assert!(matches!(err, MikiError::Api { status: 503, .. }));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(json!({"role": "assistant", "content": "late"}), "stop"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server, Duration::from_millis(100))
        .generate_text(&simple_request())
        .await
        .unwrap_err();

    assert!(matches!(err, MikiError::Timeout(100)), "{err}");
}

#[tokio::test]
async fn agent_from_config_talks_to_configured_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "ResponseFormat", "arguments": "{\"msg\":\"It is sunny.\"}"}
                }]
            }),
            "tool_calls",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = ModelEndpointConfig {
        base_url: server.uri(),
        api_key: "test-key".into(),
        ..Default::default()
    };
    let agent = Agent::from_config(&config).unwrap();

    let outcome = agent
        .invoke("req_1", "What's the weather like today?", &Context::new("req_1"))
        .await
        .unwrap();

    assert_eq!(outcome.answer_text().as_deref(), Some("It is sunny."));
}
