//! 批处理重试状态机
//!
//! 单个批次的完整生命周期：拼装提示词 -> 调用生成服务 -> 解析校验。
//! 来自客户端、解析器或 schema 校验的失败一律计入同一重试预算，
//! 固定间隔重试；预算耗尽后降级为哨兵行返回，流水线继续推进。

use crate::completion::CompletionProvider;
use crate::models::AppError;
use crate::tasks::AnnotationTask;
use backon::{ConstantBuilder, Retryable};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct BatchProcessor<T: AnnotationTask> {
    provider: Arc<dyn CompletionProvider>,
    task: T,
    max_retries: usize,
    retry_delay: Duration,
}

impl<T: AnnotationTask> BatchProcessor<T> {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        task: T,
        max_retries: usize,
        retry_delay: Duration,
    ) -> Self {
        Self {
            provider,
            task,
            max_retries,
            retry_delay,
        }
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    /// 处理单个批次。
    /// 永不向调用方抛错：最多尝试 max_retries 次，仍失败则返回哨兵行。
    pub async fn process_group(&self, group: &[String], group_index: usize) -> Vec<T::Row> {
        let prompt = self.task.build_prompt(group);

        // max_times 是首次之后的重试次数，总尝试数 = max_retries
        let backoff = ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.max_retries.saturating_sub(1));

        let attempt = AtomicUsize::new(0);
        let result: std::result::Result<Vec<T::Row>, AppError> = (|| async {
            let n = attempt.fetch_add(1, Ordering::Relaxed) + 1;
            let outcome = match self.provider.complete(&prompt).await {
                Ok(raw) => self.task.parse_rows(&raw, group_index),
                Err(e) => Err(e),
            };
            if let Err(e) = &outcome {
                warn!(
                    "[BatchProcessor] 批次 {} 第 {} 次尝试失败: {}",
                    group_index, n, e
                );
            }
            outcome
        })
        .retry(&backoff)
        .await;

        match result {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "[BatchProcessor] 批次 {} 重试 {} 次后仍失败: {}，写入哨兵行",
                    group_index, self.max_retries, e
                );
                self.task.error_rows(group_index)
            }
        }
    }
}
