use mockito::Matcher;
use repurposer::llm::remote::RemoteLlmProvider;
use repurposer::llm::{LlmProvider, LlmRequest};

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "model": "llama-3.1-70b-versatile",
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
    .to_string()
}

#[tokio::test]
async fn test_remote_provider_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer fake-api-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("This is a test response"))
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "llama-3.1-70b-versatile");

    let request = LlmRequest {
        prompt: "Test prompt".to_string(),
        max_tokens: Some(100),
        temperature: Some(0.7),
        timeout_seconds: Some(10),
        ..Default::default()
    };

    let result = provider.generate(request).await;

    assert!(result.is_ok());
    let response = result.unwrap();
    assert_eq!(response.content, "This is a test response");
    assert_eq!(response.usage.prompt_tokens, 10);
    assert_eq!(response.usage.completion_tokens, 5);
    assert_eq!(response.usage.total_tokens, 15);
    assert_eq!(response.model, "llama-3.1-70b-versatile");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_sends_system_message_and_sampling() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "test-model",
            "messages": [
                { "role": "system", "content": "You are an expert content strategist." },
                { "role": "user", "content": "Repurpose this" }
            ],
            "max_tokens": 2000,
            "top_p": 0.9
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("{}"))
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "test-model");

    let request = LlmRequest {
        system: Some("You are an expert content strategist.".to_string()),
        prompt: "Repurpose this".to_string(),
        max_tokens: Some(2000),
        temperature: Some(0.3),
        top_p: Some(0.9),
        timeout_seconds: None,
    };

    let response = provider.generate(request).await.expect("generate");
    assert_eq!(response.content, "{}");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_null_content_and_missing_usage() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "test-model");

    let response = provider
        .generate(LlmRequest {
            prompt: "Test".to_string(),
            ..Default::default()
        })
        .await
        .expect("null content is not a transport error");

    assert_eq!(response.content, "");
    assert_eq!(response.usage.total_tokens, 0);
    assert_eq!(response.model, "test-model");
}

#[tokio::test]
async fn test_remote_provider_error_handling() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Invalid API Key"}}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "bad-key", "test-model");

    let result = provider
        .generate(LlmRequest {
            prompt: "Test".to_string(),
            ..Default::default()
        })
        .await;

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("Invalid API Key"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_no_choices() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model": "m", "choices": []}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "test-model");
    let result = provider
        .generate(LlmRequest {
            prompt: "Test".to_string(),
            ..Default::default()
        })
        .await;

    assert!(result.unwrap_err().to_string().contains("no choices"));
}

#[tokio::test]
async fn test_remote_provider_timeout() {
    let mut server = mockito::Server::new_async().await;

    // Mock slow response
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(b"too late")
        })
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "test-model");

    let request = LlmRequest {
        prompt: "Test".to_string(),
        timeout_seconds: Some(1), // 1 second timeout
        ..Default::default()
    };

    let result = provider.generate(request).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("timed out"));
}
