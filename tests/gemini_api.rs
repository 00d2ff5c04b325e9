//! Gemini 适配器集成测试：以 mockito 模拟 REST 端点

use anyhow::Result;
use radlex_annotator::completion::{CompletionProvider, GeminiProvider};
use radlex_annotator::config::ApiConfig;
use radlex_annotator::models::AppErrorType;

fn api_config(base_url: String) -> ApiConfig {
    ApiConfig {
        api_key: "test-key".to_string(),
        base_url,
        model: "gemini-test".to_string(),
        temperature: 0.0,
        max_output_tokens: 8192,
    }
}

#[tokio::test]
async fn test_generate_content_extracts_candidate_text() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(mockito::Matcher::UrlEncoded(
            "key".to_string(),
            "test-key".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"reports\": []}"}]}}]}"#,
        )
        .create_async()
        .await;

    let provider = GeminiProvider::new(api_config(server.url()));
    let text = provider.complete("prompt").await?;
    assert_eq!(text, r#"{"reports": []}"#);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_empty_candidates_is_empty_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let provider = GeminiProvider::new(api_config(server.url()));
    let err = provider.complete("prompt").await.unwrap_err();
    assert!(matches!(err.error_type, AppErrorType::EmptyResponse));
}

#[tokio::test]
async fn test_http_error_status_is_network_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let provider = GeminiProvider::new(api_config(server.url()));
    let err = provider.complete("prompt").await.unwrap_err();
    assert!(matches!(err.error_type, AppErrorType::Network));
}
