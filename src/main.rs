// src/main.rs

use anyhow::Result;
use radlex_annotator::batch_processor::BatchProcessor;
use radlex_annotator::completion::GeminiProvider;
use radlex_annotator::config::{AppConfig, TaskKind};
use radlex_annotator::pipeline::Pipeline;
use radlex_annotator::tasks::{SynonymTask, UnitParsingTask};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    let provider = Arc::new(GeminiProvider::new(config.api.clone()));
    let retry_delay = Duration::from_secs(config.pipeline.retry_delay_seconds);

    info!(
        "[Main] 任务: {:?}，输入: {}，输出: {}",
        config.task, config.pipeline.input_path, config.pipeline.output_path
    );

    let summary = match config.task {
        TaskKind::Synonym => {
            let processor = BatchProcessor::new(
                provider,
                SynonymTask,
                config.pipeline.max_retries,
                retry_delay,
            );
            Pipeline::new(processor, config.pipeline.clone()).run().await?
        }
        TaskKind::UnitParsing => {
            let processor = BatchProcessor::new(
                provider,
                UnitParsingTask,
                config.pipeline.max_retries,
                retry_delay,
            );
            Pipeline::new(processor, config.pipeline.clone()).run().await?
        }
    };

    info!(
        "[Main] 运行结束: 处理 {} 批（跳过 {} 批），写出 {} 行",
        summary.batches_processed, summary.batches_skipped, summary.rows_written
    );
    Ok(())
}
