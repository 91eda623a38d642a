//! Pipeline orchestrator - reads every source, dispatches, reports, shuts down.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{InputFormat, WriterBackend};
use dispatcher::{Collector, EngineConfig};
use ingestion::{InputSource, decoder_for};
use tracing::{error, info};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Dispatch engine settings
    pub engine: EngineConfig,

    /// Wire format of input blocks
    pub input_format: InputFormat,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Sources are consumed in order. The summary is printed before the
    /// backend is shut down; a shutdown failure is logged and leaves the
    /// summary unchanged. The backend is also shut down when dispatch fails.
    pub async fn run<W>(self, backend: Arc<W>, sources: Vec<InputSource>) -> Result<PipelineStats>
    where
        W: WriterBackend + Sync + 'static,
    {
        let decoder = decoder_for(self.config.input_format);
        info!(
            backend = %backend.name(),
            decoder = decoder.name(),
            sources = sources.len(),
            parallelism = self.config.engine.parallelism,
            batch_size = self.config.engine.batch_size,
            "Starting collection"
        );

        let collector = Collector::new(backend, decoder, self.config.engine);
        drive(collector, sources).await
    }
}

/// Collect every source, then shut the backend down whether or not
/// collection succeeded
async fn drive<W>(mut collector: Collector<W>, sources: Vec<InputSource>) -> Result<PipelineStats>
where
    W: WriterBackend + Sync + 'static,
{
    let outcome = collect(&mut collector, sources).await;

    if let Err(e) = collector.shutdown().await {
        error!(error = %e, "Backend shutdown failed");
    }

    outcome
}

async fn collect<W>(collector: &mut Collector<W>, sources: Vec<InputSource>) -> Result<PipelineStats>
where
    W: WriterBackend + Sync + 'static,
{
    for mut source in sources {
        match source.read_block().await {
            Ok(block) => {
                collector
                    .ingest_block(source.name(), &block)
                    .await
                    .with_context(|| format!("Failed to dispatch frames from {}", source.name()))?;
            }
            Err(e) => collector.record_read_error(source.name(), &e),
        }
    }

    let report = collector
        .finalize()
        .await
        .context("Failed to drain outstanding writes")?;
    let stats = PipelineStats::from(report);
    stats.print_summary();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, DataBurst, DataFrame, FramePayload};
    use ingestion::JsonBurstDecoder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct FailingShutdown {
        writes: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    impl WriterBackend for FailingShutdown {
        fn name(&self) -> &str {
            "failing-shutdown"
        }

        async fn write_frame(&self, _frame: &DataFrame) -> Result<(), ContractError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn shutdown(&self) -> Result<(), ContractError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Err(ContractError::backend_shutdown("failing-shutdown", "remote hung up"))
        }
    }

    #[tokio::test]
    async fn test_shutdown_failure_keeps_summary() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        let burst = DataBurst::new(vec![
            DataFrame::new(1, FramePayload::Number(1)),
            DataFrame::new(2, FramePayload::Number(2)),
        ]);
        std::fs::write(&good, JsonBurstDecoder.encode(&burst).unwrap()).unwrap();
        std::fs::write(&bad, b"{ not json").unwrap();

        let sources = ingestion::open_sources(&[bad, good]).await.unwrap();
        let backend = Arc::new(FailingShutdown::default());
        let pipeline = Pipeline::new(PipelineConfig {
            engine: EngineConfig::new(2, 10),
            input_format: InputFormat::Json,
        });

        let stats = pipeline.run(Arc::clone(&backend), sources).await.unwrap();
        assert_eq!(stats.frames_written, 2);
        assert_eq!(stats.frames_failed, 0);
        assert_eq!(stats.decode_errors, 1);
        assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
        assert_eq!(backend.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_error_still_shuts_down_backend() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("late.json");
        let burst = DataBurst::new(vec![DataFrame::new(1, FramePayload::Number(1))]);
        std::fs::write(&input, JsonBurstDecoder.encode(&burst).unwrap()).unwrap();

        let sources = ingestion::open_sources(&[input]).await.unwrap();
        let backend = Arc::new(FailingShutdown::default());
        let mut collector = Collector::new(
            Arc::clone(&backend),
            decoder_for(InputFormat::Json),
            EngineConfig::new(2, 10),
        );
        // A finalized collector rejects new frames
        collector.finalize().await.unwrap();

        let err = drive(collector, sources).await.unwrap_err();
        assert!(err.to_string().contains("late.json"));
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
        assert_eq!(backend.shutdowns.load(Ordering::SeqCst), 1);
    }
}
