//! Collector - feeds decoded input blocks through the dispatch engine

use std::sync::Arc;

use contracts::{BurstDecoder, DataBurst, WriterBackend};
use observability::{DispatchStatsSummary, record_burst_decoded, record_decode_error};
use tracing::{debug, info, instrument, warn};

use crate::engine::{DispatchEngine, EngineConfig};
use crate::error::DispatcherError;
use crate::metrics::{ResultAccumulator, RunSummary};

/// End-of-run report
#[derive(Debug, Clone)]
pub struct CollectorReport {
    /// Final write counts
    pub summary: RunSummary,
    /// Input sources seen (including failed ones)
    pub sources: usize,
    /// Blocks that failed to decode
    pub decode_errors: usize,
    /// Sources that failed to read
    pub read_errors: usize,
    /// Frames decoded across all sources
    pub frames_decoded: u64,
    /// Drains performed
    pub drains: usize,
    /// Highest pending count observed
    pub peak_pending: usize,
    /// Latency / drain size statistics
    pub stats: DispatchStatsSummary,
}

/// Drives one run: decode each source, dispatch its frames, drain at the
/// source boundary.
pub struct Collector<W> {
    engine: DispatchEngine<W>,
    backend: Arc<W>,
    decoder: Arc<dyn BurstDecoder>,
    sources: usize,
    decode_errors: usize,
    read_errors: usize,
    frames_decoded: u64,
}

impl<W> Collector<W>
where
    W: WriterBackend + Sync + 'static,
{
    /// Create a collector with a fresh accumulator
    pub fn new(backend: Arc<W>, decoder: Arc<dyn BurstDecoder>, config: EngineConfig) -> Self {
        let engine = DispatchEngine::new(
            Arc::clone(&backend),
            Arc::new(ResultAccumulator::new()),
            config,
        );
        Self {
            engine,
            backend,
            decoder,
            sources: 0,
            decode_errors: 0,
            read_errors: 0,
            frames_decoded: 0,
        }
    }

    /// Underlying engine
    pub fn engine(&self) -> &DispatchEngine<W> {
        &self.engine
    }

    /// Decode errors so far
    pub fn decode_errors(&self) -> usize {
        self.decode_errors
    }

    /// Read errors so far
    pub fn read_errors(&self) -> usize {
        self.read_errors
    }

    /// Decode one source's block and dispatch its frames
    ///
    /// A block that fails to decode is logged, counted, and contributes no
    /// frames. Returns the number of frames dispatched.
    #[instrument(name = "collector_ingest_block", skip(self, block), fields(bytes = block.len()))]
    pub async fn ingest_block(&mut self, source: &str, block: &[u8]) -> Result<usize, DispatcherError> {
        self.sources += 1;
        let burst = match self.decoder.decode(block) {
            Ok(burst) => burst,
            Err(e) => {
                self.decode_errors += 1;
                record_decode_error(self.decoder.name());
                warn!(source, decoder = self.decoder.name(), error = %e, "Decode failed, skipping source");
                return Ok(0);
            }
        };
        record_burst_decoded(burst.len());
        self.dispatch(source, burst).await
    }

    /// Dispatch an already decoded burst
    pub async fn ingest_burst(&mut self, source: &str, burst: DataBurst) -> Result<usize, DispatcherError> {
        self.sources += 1;
        self.dispatch(source, burst).await
    }

    /// Count a source whose bytes could not be read
    pub fn record_read_error(&mut self, source: &str, error: &dyn std::error::Error) {
        self.sources += 1;
        self.read_errors += 1;
        warn!(source, error = %error, "Read failed, skipping source");
    }

    async fn dispatch(&mut self, source: &str, burst: DataBurst) -> Result<usize, DispatcherError> {
        let frames = burst.len();
        self.frames_decoded += frames as u64;
        for frame in burst {
            self.engine.submit(frame).await?;
        }
        self.engine.end_burst().await?;
        debug!(source, frames, "Source dispatched");
        Ok(frames)
    }

    /// Drain everything and build the report
    #[instrument(name = "collector_finalize", skip(self))]
    pub async fn finalize(&mut self) -> Result<CollectorReport, DispatcherError> {
        let summary = self.engine.finalize().await?;
        let report = CollectorReport {
            summary,
            sources: self.sources,
            decode_errors: self.decode_errors,
            read_errors: self.read_errors,
            frames_decoded: self.frames_decoded,
            drains: self.engine.drain_history().len(),
            peak_pending: self.engine.peak_pending(),
            stats: self.engine.stats(),
        };

        info!(
            backend = %self.backend.name(),
            frames_written = summary.frames_written(),
            failed = summary.failed,
            decode_errors = report.decode_errors,
            read_errors = report.read_errors,
            sources = report.sources,
            elapsed_secs = summary.elapsed_secs(),
            frames_per_second = summary.frames_per_second(),
            "Run complete"
        );
        Ok(report)
    }

    /// Shut the backend down (after draining anything left)
    #[instrument(name = "collector_shutdown", skip(self))]
    pub async fn shutdown(mut self) -> Result<(), DispatcherError> {
        self.engine.end_burst().await?;
        self.backend.shutdown().await?;
        Ok(())
    }
}
