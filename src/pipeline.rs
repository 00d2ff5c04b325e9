//! 流水线驱动
//!
//! 严格顺序执行：一个批次（含其全部重试与等待）完整结束后才开始下一个。
//! 结果先进内存缓冲，每 flush_every_n_batches 个批次合并落盘一次，
//! 结尾再落盘剩余部分；断点续跑时跳过上次已落盘的批次。
//!
//! 批处理内部的失败已降级为哨兵行；这里向上冒出的错误（读输入表、
//! 落盘）都是致命的，直接终止本次运行。

use crate::batch_processor::BatchProcessor;
use crate::config::PipelineConfig;
use crate::models::AppError;
use crate::table_store::{self, Checkpoint};
use crate::tasks::AnnotationTask;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

type Result<T> = std::result::Result<T, AppError>;

/// 按固定批大小连续切分，末批可以不满
pub fn partition<T>(items: &[T], batch_size: usize) -> Vec<&[T]> {
    items.chunks(batch_size).collect()
}

/// 一次运行的汇总
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total_items: usize,
    pub total_batches: usize,
    pub batches_processed: usize,
    pub batches_skipped: usize,
    pub rows_written: usize,
}

pub struct Pipeline<T: AnnotationTask> {
    processor: BatchProcessor<T>,
    config: PipelineConfig,
}

impl<T: AnnotationTask> Pipeline<T> {
    pub fn new(processor: BatchProcessor<T>, config: PipelineConfig) -> Self {
        Self { processor, config }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;

        let input_path = PathBuf::from(&self.config.input_path);
        let output_path = PathBuf::from(&self.config.output_path);

        let items =
            table_store::load_input_column(&input_path, self.processor.task().input_column())?;
        let groups = partition(&items, self.config.batch_size);
        let total_batches = groups.len();

        let batches_flushed = table_store::load_checkpoint(&output_path, self.config.batch_size);
        if batches_flushed > 0 {
            info!(
                "[Pipeline] 断点续跑：跳过已落盘的前 {} 个批次",
                batches_flushed
            );
        }

        let mut summary = RunSummary {
            total_items: items.len(),
            total_batches,
            batches_skipped: batches_flushed.min(total_batches),
            ..Default::default()
        };

        info!(
            "[Pipeline] 任务 {}: {} 条输入，批大小 {}，共 {} 批",
            self.processor.task().name(),
            items.len(),
            self.config.batch_size,
            total_batches
        );

        let mut buffer: Vec<T::Row> = Vec::new();
        let start_time = Instant::now();

        for (group_index, group) in groups.iter().enumerate() {
            if group_index < batches_flushed {
                continue;
            }

            let group_start = Instant::now();
            let rows = self.processor.process_group(group, group_index).await;
            info!(
                "[Pipeline] 批次 {}/{} 完成：{} 行，批耗时 {:.2}s，累计 {:.2}s",
                group_index + 1,
                total_batches,
                rows.len(),
                group_start.elapsed().as_secs_f64(),
                start_time.elapsed().as_secs_f64()
            );
            buffer.extend(rows);
            summary.batches_processed += 1;

            if (group_index + 1) % self.config.flush_every_n_batches == 0 {
                info!("[Pipeline] 导出截至批次 {} 的累计结果...", group_index);
                summary.rows_written += self.flush(&output_path, &mut buffer, group_index + 1)?;
            }
        }

        if !buffer.is_empty() {
            info!("[Pipeline] 导出剩余结果...");
            summary.rows_written += self.flush(&output_path, &mut buffer, total_batches)?;
        }

        info!(
            "[Pipeline] 处理完成，总耗时 {:.2}s，写出 {} 行",
            start_time.elapsed().as_secs_f64(),
            summary.rows_written
        );
        Ok(summary)
    }

    /// 合并落盘并推进断点，成功后清空缓冲
    fn flush(
        &self,
        output_path: &Path,
        buffer: &mut Vec<T::Row>,
        batches_done: usize,
    ) -> Result<usize> {
        let flushed = buffer.len();
        table_store::append_rows(output_path, buffer)?;
        table_store::save_checkpoint(
            output_path,
            &Checkpoint {
                batches_flushed: batches_done,
                batch_size: self.config.batch_size,
            },
        )?;
        buffer.clear();
        Ok(flushed)
    }
}
