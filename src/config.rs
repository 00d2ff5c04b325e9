// src/config.rs

use crate::models::AppError;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, AppError>;

/// Gemini API 配置。
/// 温度固定为 0 保证确定性解码；输出 token 上限对应单批响应的体量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

// 默认值函数
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-thinking-exp-01-21".to_string()
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    0.0
}

/// 任务族：词条同义词扩展 / 报告词元解析
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Synonym,
    UnitParsing,
}

/// 流水线配置（路径、批大小、落盘与重试参数）。
/// retry_delay_seconds 是固定的重试间隔：同义词任务惯用 5s，词元解析 2s。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input_path: String,
    pub output_path: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_flush_every_n_batches")]
    pub flush_every_n_batches: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,
}

fn default_batch_size() -> usize {
    15
}

fn default_flush_every_n_batches() -> usize {
    20
}

fn default_max_retries() -> usize {
    10
}

fn default_retry_delay_seconds() -> u64 {
    5
}

/// 顶层配置：任务选择 + API + 流水线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub task: TaskKind,
    #[serde(default = "default_api_config")]
    pub api: ApiConfig,
    pub pipeline: PipelineConfig,
}

fn default_api_config() -> ApiConfig {
    ApiConfig {
        api_key: String::new(),
        base_url: default_base_url(),
        model: default_model(),
        temperature: default_temperature(),
        max_output_tokens: default_max_output_tokens(),
    }
}

impl AppConfig {
    /// 从 TOML 配置文件与环境变量加载配置。
    ///
    /// 配置文件路径取 `RADLEX_CONFIG`，缺省 `config.toml`；
    /// `RADLEX_` 前缀的环境变量可覆盖任意字段（如 `RADLEX_PIPELINE__BATCH_SIZE`）；
    /// `GEMINI_API_KEY` 优先于配置文件中的 `api.api_key`。
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("RADLEX_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("RADLEX").separator("__"))
            .build()
            .map_err(|e| AppError::configuration(format!("配置加载失败: {}", e)))?;

        let mut cfg: AppConfig = settings
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("配置解析失败: {}", e)))?;

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                cfg.api.api_key = key;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.api_key.is_empty() {
            return Err(AppError::configuration(
                "缺少 Gemini API Key（设置 GEMINI_API_KEY 或 api.api_key）",
            ));
        }
        self.pipeline.validate()
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(AppError::configuration("batch_size 必须大于 0"));
        }
        if self.flush_every_n_batches == 0 {
            return Err(AppError::configuration("flush_every_n_batches 必须大于 0"));
        }
        if self.max_retries == 0 {
            return Err(AppError::configuration("max_retries 必须大于 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_config() -> PipelineConfig {
        PipelineConfig {
            input_path: "input.csv".to_string(),
            output_path: "output.csv".to_string(),
            batch_size: default_batch_size(),
            flush_every_n_batches: default_flush_every_n_batches(),
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay_seconds(),
        }
    }

    #[test]
    fn test_defaults_match_task_conventions() {
        let cfg: PipelineConfig = serde_json::from_str(
            r#"{"input_path": "a.csv", "output_path": "b.csv"}"#,
        )
        .unwrap();
        assert_eq!(cfg.batch_size, 15);
        assert_eq!(cfg.flush_every_n_batches, 20);
        assert_eq!(cfg.max_retries, 10);
        assert_eq!(cfg.retry_delay_seconds, 5);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut cfg = pipeline_config();
        cfg.batch_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_task_kind_snake_case() {
        let task: TaskKind = serde_json::from_str(r#""unit_parsing""#).unwrap();
        assert_eq!(task, TaskKind::UnitParsing);
    }
}
