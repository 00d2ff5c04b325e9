//! 表格存取层
//!
//! 输入与产出均为 CSV。落盘是「读旧表 + 追加缓冲 + 同目录临时文件改名」：
//! 既有行永远在前，崩溃在改名之前只会留下临时文件，不会截断既有产出。
//! 旁路 checkpoint 记录已落盘的批次数，供跨次运行续跑。

use crate::models::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

type Result<T> = std::result::Result<T, AppError>;

/// 读取输入表的一列，全部按字符串处理，缺失值保留为空串。
/// `column` 为 None 时按无表头的单列文件读取。
pub fn load_input_column(path: &Path, column: Option<&str>) -> Result<Vec<String>> {
    let mut values = Vec::new();
    match column {
        Some(name) => {
            let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
            let headers = reader.headers()?.clone();
            let idx = headers.iter().position(|h| h == name).ok_or_else(|| {
                AppError::file_system(format!(
                    "输入表缺少列 '{}': {}",
                    name,
                    path.display()
                ))
            })?;
            for record in reader.records() {
                let record = record?;
                values.push(record.get(idx).unwrap_or("").to_string());
            }
        }
        None => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(path)?;
            for record in reader.records() {
                let record = record?;
                values.push(record.get(0).unwrap_or("").to_string());
            }
        }
    }
    Ok(values)
}

/// 读取既有产出表；文件不存在时返回空
pub fn load_existing_rows<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// 合并既有行与新行后整表重写。
/// 空缓冲直接返回，不触碰既有产出。
pub fn append_rows<R: Serialize + DeserializeOwned>(path: &Path, new_rows: &[R]) -> Result<()> {
    if new_rows.is_empty() {
        return Ok(());
    }
    let existing: Vec<R> = load_existing_rows(path)?;

    let tmp = tempfile::NamedTempFile::new_in(parent_dir(path))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        for row in existing.iter().chain(new_rows.iter()) {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    tmp.persist(path)
        .map_err(|e| AppError::file_system(format!("产出表改名落盘失败: {}", e)))?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

// ============ Checkpoint ============

/// 流水线断点：已落盘的批次数与计算时使用的批大小
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub batches_flushed: usize,
    pub batch_size: usize,
}

/// 断点文件放在产出表旁边
pub fn checkpoint_path(output_path: &Path) -> PathBuf {
    let mut os = output_path.as_os_str().to_owned();
    os.push(".checkpoint.json");
    PathBuf::from(os)
}

/// 读取断点，返回可跳过的批次数。
/// 批大小不一致时批次边界已经错位，断点失效并告警。
pub fn load_checkpoint(output_path: &Path, batch_size: usize) -> usize {
    let path = checkpoint_path(output_path);
    if !path.exists() {
        return 0;
    }
    let parsed = std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str::<Checkpoint>(&s).ok());
    match parsed {
        Some(cp) if cp.batch_size == batch_size => cp.batches_flushed,
        Some(cp) => {
            warn!(
                "[TableStore] 断点批大小 {} 与当前 {} 不一致，忽略断点",
                cp.batch_size, batch_size
            );
            0
        }
        None => {
            warn!("[TableStore] 断点文件无法解析，忽略: {}", path.display());
            0
        }
    }
}

/// 写断点，同样经临时文件改名
pub fn save_checkpoint(output_path: &Path, checkpoint: &Checkpoint) -> Result<()> {
    let path = checkpoint_path(output_path);
    let tmp = tempfile::NamedTempFile::new_in(parent_dir(&path))?;
    serde_json::to_writer(tmp.as_file(), checkpoint)
        .map_err(|e| AppError::file_system(format!("断点序列化失败: {}", e)))?;
    tmp.persist(&path)
        .map_err(|e| AppError::file_system(format!("断点落盘失败: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SynonymRow;
    use tempfile::tempdir;

    fn row(term: &str) -> SynonymRow {
        SynonymRow {
            term: term.to_string(),
            category_1: format!("{}-1", term),
            category_2: String::new(),
            category_3: String::new(),
            category_4: String::new(),
        }
    }

    #[test]
    fn test_flush_accumulation_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        append_rows(&path, &[row("a"), row("b")]).unwrap();
        append_rows(&path, &[row("c")]).unwrap();

        let rows: Vec<SynonymRow> = load_existing_rows(&path).unwrap();
        let terms: Vec<&str> = rows.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_flush_empty_buffer_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        // 不存在的产出表保持不存在
        append_rows::<SynonymRow>(&path, &[]).unwrap();
        assert!(!path.exists());

        append_rows(&path, &[row("a")]).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();
        append_rows::<SynonymRow>(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_load_input_column_by_name_keeps_missing_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(
            &path,
            "Class ID,Preferred Label\nRID1,pleura\nRID2,\nRID3,bronchiectasis\n",
        )
        .unwrap();

        let values = load_input_column(&path, Some("Preferred Label")).unwrap();
        assert_eq!(values, vec!["pleura", "", "bronchiectasis"]);
    }

    #[test]
    fn test_load_input_column_headerless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "first report\nsecond report\n").unwrap();

        let values = load_input_column(&path, None).unwrap();
        assert_eq!(values, vec!["first report", "second report"]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "Other Column\nvalue\n").unwrap();
        assert!(load_input_column(&path, Some("Preferred Label")).is_err());
    }

    #[test]
    fn test_checkpoint_roundtrip_and_batch_size_guard() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.csv");

        assert_eq!(load_checkpoint(&output, 5), 0);

        save_checkpoint(
            &output,
            &Checkpoint {
                batches_flushed: 40,
                batch_size: 5,
            },
        )
        .unwrap();

        assert_eq!(load_checkpoint(&output, 5), 40);
        // 批大小变化后断点失效
        assert_eq!(load_checkpoint(&output, 15), 0);
    }
}
