//! JSON 响应解析模块
//!
//! 模型返回的文本可能混有前后缀说明、markdown 代码围栏或裸 "json" 语言标记。
//! 这里负责剥离噪声、按首个 `{` 到末个 `}` 抽取 JSON 对象、校验顶层键，
//! 并反序列化为任务各自的记录类型。
//!
//! 贪婪抽取默认整段文本里只有一个完整 JSON 对象；当跨度内串联了多个对象时
//! 返回 AmbiguousResponse，而不是悄悄合并出错误的结果。

use crate::models::{AppError, ReportAnnotation, TermSynonyms};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

type Result<T> = std::result::Result<T, AppError>;

static RE_CODE_FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*```[\w-]*\s*$").expect("static regex"));

/// 同义词任务响应的顶层键
pub const SYNONYM_KEY: &str = "term_and_synonyms";

/// 词元解析任务响应的顶层键
pub const UNIT_PARSING_KEY: &str = "reports";

/// 从任意包围文本中抽取 JSON 对象
pub fn extract_json_object(text: &str) -> Result<Value> {
    let cleaned = RE_CODE_FENCE_LINE.replace_all(text, "");
    let cleaned = cleaned.trim();

    // 去掉裸 "json" 语言标记前缀
    let cleaned = match cleaned.get(..4) {
        Some(head) if head.eq_ignore_ascii_case("json") => cleaned[4..].trim_start(),
        _ => cleaned,
    };

    let start = cleaned.find('{').ok_or_else(|| {
        AppError::malformed_response("No valid JSON object found in the response.")
    })?;
    let end = cleaned.rfind('}').ok_or_else(|| {
        AppError::malformed_response("No valid JSON object found in the response.")
    })?;
    if end < start {
        return Err(AppError::malformed_response(
            "No valid JSON object found in the response.",
        ));
    }
    let span = &cleaned[start..=end];

    match serde_json::from_str::<Value>(span) {
        Ok(value) => Ok(value),
        Err(decode_err) => {
            // 跨度整体解析失败时，从首个 '{' 流式读出一个完整对象，
            // 其后若还有对象，说明是串联输出而非单纯的坏 JSON
            if let Some(consumed) = leading_object_len(span) {
                if span[consumed..].contains('{') {
                    return Err(AppError::ambiguous_response(format!(
                        "Multiple JSON objects found in the response: {}",
                        decode_err
                    )));
                }
            }
            Err(AppError::malformed_response(format!(
                "JSONDecodeError: {}",
                decode_err
            )))
        }
    }
}

/// 从跨度开头流式读取一个完整 JSON 值，返回其消耗的字节数
fn leading_object_len(span: &str) -> Option<usize> {
    let mut stream = serde_json::Deserializer::from_str(span).into_iter::<Value>();
    match stream.next() {
        Some(Ok(_)) => Some(stream.byte_offset()),
        _ => None,
    }
}

/// 校验顶层键存在并取出其值
pub fn require_key(value: Value, key: &str) -> Result<Value> {
    match value {
        Value::Object(mut map) => map.remove(key).ok_or_else(|| {
            AppError::schema_violation(format!(
                "Invalid response format: '{}' key not found.",
                key
            ))
        }),
        _ => Err(AppError::schema_violation(format!(
            "Invalid response format: '{}' key not found.",
            key
        ))),
    }
}

/// 解析同义词任务响应为逐词条记录
pub fn parse_term_synonyms(raw: &str) -> Result<Vec<TermSynonyms>> {
    let payload = require_key(extract_json_object(raw)?, SYNONYM_KEY)?;
    serde_json::from_value(payload)
        .map_err(|e| AppError::schema_violation(format!("'{}' 记录结构不符: {}", SYNONYM_KEY, e)))
}

/// 解析词元解析任务响应为逐报告记录
pub fn parse_report_annotations(raw: &str) -> Result<Vec<ReportAnnotation>> {
    let payload = require_key(extract_json_object(raw)?, UNIT_PARSING_KEY)?;
    serde_json::from_value(payload).map_err(|e| {
        AppError::schema_violation(format!("'{}' 记录结构不符: {}", UNIT_PARSING_KEY, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppErrorType;
    use assert_matches::assert_matches;
    use serde_json::json;

    const OBJ: &str = r#"{"term_and_synonyms": [{"term": "pleura", "category_1": ["pleural"], "category_2": [], "category_3": [], "category_4": []}]}"#;

    #[test]
    fn test_roundtrip_with_surrounding_prose() {
        let bare = extract_json_object(OBJ).unwrap();
        let wrapped = format!("Sure, here is the result you asked for.\n{}\nHope this helps!", OBJ);
        assert_eq!(extract_json_object(&wrapped).unwrap(), bare);
    }

    #[test]
    fn test_strips_json_marker_and_code_fence() {
        let text = format!("```json\n{}\n```", OBJ);
        assert!(extract_json_object(&text).is_ok());

        let text = format!("json\n{}", OBJ);
        assert!(extract_json_object(&text).is_ok());

        // 标记大小写不敏感
        let text = format!("JSON {}", OBJ);
        assert!(extract_json_object(&text).is_ok());
    }

    #[test]
    fn test_no_brace_span_is_malformed() {
        let err = extract_json_object("no object here").unwrap_err();
        assert_matches!(err.error_type, AppErrorType::MalformedResponse);

        let err = extract_json_object("} reversed {").unwrap_err();
        assert_matches!(err.error_type, AppErrorType::MalformedResponse);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = extract_json_object(r#"{"term_and_synonyms": [unquoted]}"#).unwrap_err();
        assert_matches!(err.error_type, AppErrorType::MalformedResponse);
    }

    #[test]
    fn test_concatenated_objects_are_ambiguous() {
        let text = r#"{"reports": []}
{"reports": []}"#;
        let err = extract_json_object(text).unwrap_err();
        assert_matches!(err.error_type, AppErrorType::AmbiguousResponse);
    }

    #[test]
    fn test_missing_top_level_key_is_schema_violation() {
        let err = require_key(json!({"something_else": []}), SYNONYM_KEY).unwrap_err();
        assert_matches!(err.error_type, AppErrorType::SchemaViolation);
    }

    #[test]
    fn test_parse_term_synonyms() {
        let records = parse_term_synonyms(OBJ).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].term, "pleura");
        assert_eq!(records[0].category_1.to_cell(), "pleural");
    }

    #[test]
    fn test_parse_report_annotations() {
        let raw = r#"{"reports": [{"report_index": 1, "lexicon_units": [{"unit": "consolidation", "category": 2}]}]}"#;
        let reports = parse_report_annotations(raw).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report_index, 1);
        assert_eq!(reports[0].lexicon_units[0].unit, "consolidation");
        assert_eq!(reports[0].lexicon_units[0].category, 2);
    }

    #[test]
    fn test_wrong_record_shape_is_schema_violation() {
        let raw = r#"{"reports": [{"lexicon_units": []}]}"#;
        let err = parse_report_annotations(raw).unwrap_err();
        assert_matches!(err.error_type, AppErrorType::SchemaViolation);
    }
}
