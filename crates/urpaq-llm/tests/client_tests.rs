use httpmock::prelude::*;
use serde_json::json;

use urpaq_core::config::LlmSettings;
use urpaq_core::error::Error;
use urpaq_core::traits::ChatModel;
use urpaq_llm::{Llm7Client, LlmError};

fn settings_for(server: &MockServer) -> LlmSettings {
    LlmSettings {
        base_url: server.url("/v1/"),
        api_key: "secret-key".into(),
        model: "bidara".into(),
        ..LlmSettings::default()
    }
}

#[tokio::test]
async fn chat_posts_request_and_returns_first_choice() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer secret-key")
            .json_body(json!({
                "model": "bidara",
                "messages": [{"role": "user", "content": "Привет"}],
                "temperature": 0.7,
                "max_tokens": 500
            }));
        then.status(200).json_body(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1730000000,
            "model": "bidara",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Здравствуйте!"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "второй"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }));
    });

    let client = Llm7Client::new(&settings_for(&server)).unwrap();
    let answer = client.chat("Привет").await.unwrap();

    mock.assert();
    assert_eq!(answer, "Здравствуйте!");
}

#[tokio::test]
async fn missing_optional_fields_are_tolerated() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        }));
    });

    let client = Llm7Client::new(&settings_for(&server)).unwrap();
    let completion = client.complete("q").await.unwrap();
    assert!(completion.usage.is_none());
    assert_eq!(completion.choices[0].message.content, "ok");
}

#[tokio::test]
async fn zero_choices_is_an_empty_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({"choices": []}));
    });

    let client = Llm7Client::new(&settings_for(&server)).unwrap();
    assert!(matches!(client.chat("q").await, Err(LlmError::EmptyResponse)));
}

#[tokio::test]
async fn http_errors_are_classified() {
    let server = MockServer::start();
    let mut unauthorized = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(401).body("bad key");
    });
    let client = Llm7Client::new(&settings_for(&server)).unwrap();
    assert!(matches!(client.chat("q").await, Err(LlmError::Authentication(m)) if m == "bad key"));
    unauthorized.delete();

    let mut limited = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429);
    });
    assert!(matches!(client.chat("q").await, Err(LlmError::RateLimited)));
    limited.delete();

    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(502).body("upstream");
    });
    assert!(matches!(client.chat("q").await, Err(LlmError::Api { status: 502, .. })));
}

#[tokio::test]
async fn undecodable_body_is_a_serialization_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).body("<html>not json</html>");
    });
    let client = Llm7Client::new(&settings_for(&server)).unwrap();
    assert!(matches!(client.chat("q").await, Err(LlmError::Serialization(_))));
}

#[tokio::test]
async fn chat_model_trait_maps_to_core_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500).body("boom");
    });
    let client = Llm7Client::new(&settings_for(&server)).unwrap();
    let model: &dyn ChatModel = &client;
    assert!(matches!(model.chat("q").await, Err(Error::Llm(_))));
}
