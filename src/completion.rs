// src/completion.rs

use crate::config::ApiConfig;
use crate::gemini_adapter;
use crate::models::AppError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

type Result<T> = std::result::Result<T, AppError>;

/// 生成服务的统一入口。
/// 批处理层只依赖该 trait，测试中以脚本化实现替换真实 API。
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Gemini REST API 的 Provider 实现
pub struct GeminiProvider {
    client: Client,
    config: ApiConfig,
}

impl GeminiProvider {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: create_http_client_with_fallback(),
            config,
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        gemini_adapter::generate_content(&self.client, &self.config, prompt).await
    }
}

/// 创建HTTP客户端，使用渐进式回退策略确保始终有合理的配置
fn create_http_client_with_fallback() -> Client {
    // 尝试1: 完整配置的客户端（推荐配置）
    if let Ok(client) = ClientBuilder::new()
        .timeout(std::time::Duration::from_secs(300)) // 全局超时300秒
        .connect_timeout(std::time::Duration::from_secs(30)) // 连接超时30秒
        .use_rustls_tls() // 使用rustls而不是系统TLS
        .build()
    {
        return client;
    }

    // 尝试2: 仅超时配置的客户端
    if let Ok(client) = ClientBuilder::new()
        .timeout(std::time::Duration::from_secs(300))
        .build()
    {
        return client;
    }

    // 最终回退: 默认客户端
    Client::new()
}
