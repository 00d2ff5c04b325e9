// src/gemini_adapter.rs

use crate::config::ApiConfig;
use crate::models::AppError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

type Result<T> = std::result::Result<T, AppError>;

/// 处理非流式生成请求。
/// 纯适配器：不含重试逻辑，失败原样抛给调用方。
pub async fn generate_content(
    client: &Client,
    config: &ApiConfig,
    prompt: &str,
) -> Result<String> {
    let url = build_gemini_url(config)?;
    let body = build_gemini_request_body(prompt, config)?;

    let response = client
        .post(&url)
        .json(&body)
        .timeout(Duration::from_secs(300))
        .send()
        .await
        .map_err(|e| AppError::network(format!("Gemini API request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(AppError::network(format!(
            "Gemini API error: {} - {}",
            status, error_text
        )));
    }

    let response_json: Value = response
        .json()
        .await
        .map_err(|e| AppError::network(format!("Failed to parse Gemini response: {}", e)))?;

    // 提取响应内容
    let content = response_json
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    if content.is_empty() {
        return Err(AppError::empty_response(
            "Received an empty response from the API.",
        ));
    }

    Ok(content)
}

/// 构建 Gemini API URL
fn build_gemini_url(config: &ApiConfig) -> Result<String> {
    Ok(format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        config.base_url.trim_end_matches('/'),
        config.model,
        config.api_key
    ))
}

/// 构建 Gemini 请求体。
/// 临床文本容易误触内容安全拦截，四类安全阈值全部设为 BLOCK_NONE。
fn build_gemini_request_body(prompt: &str, config: &ApiConfig) -> Result<Value> {
    Ok(json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "temperature": config.temperature,
            "maxOutputTokens": config.max_output_tokens,
        },
        "safetySettings": [
            { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" },
            { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
            { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_NONE" },
            { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_NONE" }
        ]
    }))
}
