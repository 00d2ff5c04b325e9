//! RadLex 批量标注流水线
//!
//! 把医学词条/CT 报告分批发送给 Gemini，解析内嵌在响应文本中的结构化
//! JSON，展开为表格行并周期性合并落盘。支持两个任务族：
//! 词条同义词扩展（synonym）与报告词元解析（unit_parsing）。

pub mod batch_processor;
pub mod completion;
pub mod config;
pub mod gemini_adapter;
pub mod models;
pub mod pipeline;
pub mod prompt_builder;
pub mod response_parser;
pub mod table_store;
pub mod tasks;
