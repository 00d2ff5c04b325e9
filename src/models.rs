// src/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;

// ============ 领域记录 ============

/// 同义词任务：模型为单个词条返回的分类同义词组。
/// 四个类别分别为词形变体、拼写变体、缩写、严格语义同义词。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermSynonyms {
    pub term: String,
    #[serde(default)]
    pub category_1: CategoryCell,
    #[serde(default)]
    pub category_2: CategoryCell,
    #[serde(default)]
    pub category_3: CategoryCell,
    #[serde(default)]
    pub category_4: CategoryCell,
}

/// 类别单元格：正常响应为字符串列表，个别情况下模型会给出裸字符串或 null
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryCell {
    List(Vec<String>),
    Text(String),
    Null,
}

impl CategoryCell {
    /// 列表以 '|' 连接为单元格字符串（无括号、无引号），裸字符串原样保留
    pub fn to_cell(&self) -> String {
        match self {
            CategoryCell::List(items) => items.join("|"),
            CategoryCell::Text(text) => text.clone(),
            CategoryCell::Null => String::new(),
        }
    }
}

impl Default for CategoryCell {
    fn default() -> Self {
        CategoryCell::List(Vec::new())
    }
}

/// 词元解析任务：模型对单份报告的标注结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAnnotation {
    pub report_index: i64,
    pub lexicon_units: Vec<LexiconUnit>,
}

/// 报告中的一个词元及其类别（1..6）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconUnit {
    pub unit: String,
    pub category: i64,
}

// ============ 输出行 ============

/// 同义词任务输出行，类别单元格为 '|' 连接的同义词串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymRow {
    pub term: String,
    pub category_1: String,
    pub category_2: String,
    pub category_3: String,
    pub category_4: String,
}

/// 词元解析任务输出行，列名与历史产出保持一致。
/// 全部以字符串承载，哨兵行可以写入 "error" 标记。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRow {
    #[serde(rename = "Group Index")]
    pub group_index: String,
    #[serde(rename = "Report Index")]
    pub report_index: String,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Category")]
    pub category: String,
}

// ============ 结构化错误处理 ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppErrorType {
    /// 服务返回空文本
    EmptyResponse,
    /// 响应中找不到 JSON 对象或 JSON 解码失败
    MalformedResponse,
    /// 顶层必需键缺失或记录结构不符
    SchemaViolation,
    /// 响应中串联了多个 JSON 对象，贪婪抽取无法唯一定位
    AmbiguousResponse,
    Network,
    FileSystem,
    Configuration,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppError {
    pub error_type: AppErrorType,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn new(error_type: AppErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_type: AppErrorType,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_type,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::EmptyResponse, message)
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::MalformedResponse, message)
    }

    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::SchemaViolation, message)
    }

    pub fn ambiguous_response(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::AmbiguousResponse, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::Network, message)
    }

    pub fn file_system(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::FileSystem, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::Configuration, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(AppErrorType::Unknown, message)
    }
}

// 实现Display trait
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

// 实现Error trait
impl std::error::Error for AppError {}

// 实现从其他错误类型的转换
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::file_system(format!("文件系统错误: {}", err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::file_system(format!("CSV读写错误: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::malformed_response(format!("JSONDecodeError: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_cell_join() {
        let cell = CategoryCell::List(vec![
            "air trapping".to_string(),
            "air-trapping".to_string(),
            "airtrapping".to_string(),
        ]);
        assert_eq!(cell.to_cell(), "air trapping|air-trapping|airtrapping");
    }

    #[test]
    fn test_category_cell_degenerate_shapes() {
        // 模型偶尔返回裸字符串或 null，不应崩溃
        assert_eq!(CategoryCell::Text("MI".to_string()).to_cell(), "MI");
        assert_eq!(CategoryCell::Null.to_cell(), "");
        assert_eq!(CategoryCell::default().to_cell(), "");
    }

    #[test]
    fn test_term_synonyms_missing_category_defaults_empty() {
        let value: TermSynonyms =
            serde_json::from_str(r#"{"term": "pleura", "category_1": ["pleural"]}"#).unwrap();
        assert_eq!(value.term, "pleura");
        assert_eq!(value.category_1.to_cell(), "pleural");
        assert_eq!(value.category_3.to_cell(), "");
    }
}
