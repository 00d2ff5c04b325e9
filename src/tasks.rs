//! 任务族定义
//!
//! 同义词扩展与报告词元解析共用同一条流水线，差异（输入列、提示词、
//! 响应 schema、行展开、哨兵行）收敛到 AnnotationTask trait。

use crate::models::{AppError, SynonymRow, UnitRow};
use crate::prompt_builder;
use crate::response_parser;
use serde::de::DeserializeOwned;
use serde::Serialize;

type Result<T> = std::result::Result<T, AppError>;

pub trait AnnotationTask: Send + Sync {
    /// 展开后的输出行类型
    type Row: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    /// 输入表的取值列；None 表示按无表头的单列文件读取
    fn input_column(&self) -> Option<&'static str>;

    /// 拼装单批提示词
    fn build_prompt(&self, group: &[String]) -> String;

    /// 解析响应并展开为输出行（每个词元/类别条目一行）
    fn parse_rows(&self, raw: &str, group_index: usize) -> Result<Vec<Self::Row>>;

    /// 批次耗尽重试后的哨兵行，保证下游行数可追溯
    fn error_rows(&self, group_index: usize) -> Vec<Self::Row>;
}

/// RadLex 词条同义词扩展任务
pub struct SynonymTask;

impl AnnotationTask for SynonymTask {
    type Row = SynonymRow;

    fn name(&self) -> &'static str {
        "synonym"
    }

    fn input_column(&self) -> Option<&'static str> {
        Some("Preferred Label")
    }

    fn build_prompt(&self, group: &[String]) -> String {
        prompt_builder::build_synonym_prompt(group)
    }

    fn parse_rows(&self, raw: &str, _group_index: usize) -> Result<Vec<SynonymRow>> {
        let records = response_parser::parse_term_synonyms(raw)?;
        Ok(records
            .into_iter()
            .map(|r| SynonymRow {
                term: r.term,
                category_1: r.category_1.to_cell(),
                category_2: r.category_2.to_cell(),
                category_3: r.category_3.to_cell(),
                category_4: r.category_4.to_cell(),
            })
            .collect())
    }

    fn error_rows(&self, _group_index: usize) -> Vec<SynonymRow> {
        vec![SynonymRow {
            term: "error".to_string(),
            category_1: "error".to_string(),
            category_2: "error".to_string(),
            category_3: "error".to_string(),
            category_4: "error".to_string(),
        }]
    }
}

/// CT 报告词元解析任务
pub struct UnitParsingTask;

impl AnnotationTask for UnitParsingTask {
    type Row = UnitRow;

    fn name(&self) -> &'static str {
        "unit_parsing"
    }

    fn input_column(&self) -> Option<&'static str> {
        None
    }

    fn build_prompt(&self, group: &[String]) -> String {
        prompt_builder::build_unit_parsing_prompt(group)
    }

    fn parse_rows(&self, raw: &str, group_index: usize) -> Result<Vec<UnitRow>> {
        let reports = response_parser::parse_report_annotations(raw)?;
        let mut rows = Vec::new();
        for report in reports {
            for unit in report.lexicon_units {
                rows.push(UnitRow {
                    group_index: group_index.to_string(),
                    report_index: report.report_index.to_string(),
                    unit: unit.unit,
                    category: unit.category.to_string(),
                });
            }
        }
        Ok(rows)
    }

    fn error_rows(&self, group_index: usize) -> Vec<UnitRow> {
        // 组索引保留真实值，失败可回溯到具体批次
        vec![UnitRow {
            group_index: group_index.to_string(),
            report_index: "error".to_string(),
            unit: "error".to_string(),
            category: "error".to_string(),
        }]
    }
}
