//! DispatchEngine - bounded-concurrency write dispatch
//!
//! Two bounds hold at the same time:
//! - the `AdmissionGate` caps concurrently running writes at `parallelism`
//! - batch draining caps admitted-but-uncounted outcomes at `batch_size`

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    ContractError, DEFAULT_BATCH_SIZE, DataFrame, GeneralConfig, WriterBackend,
    normalize_batch_size, normalize_parallelism,
};
use observability::{
    DispatchStatsAggregator, DispatchStatsSummary, record_drain, record_frame_written,
    record_writes_in_flight,
};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::gate::AdmissionGate;
use crate::metrics::{ResultAccumulator, RunSummary};
use crate::ticket::DispatchTicket;

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Max concurrent writes (>= 1)
    pub parallelism: usize,
    /// Admitted frames that trigger a drain (>= 1)
    pub batch_size: usize,
    /// Per-write timeout; a write exceeding it counts as failed
    pub write_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl EngineConfig {
    /// Create from raw configured values (`<= 0` falls back to defaults)
    pub fn new(parallelism: i64, batch_size: i64) -> Self {
        Self {
            parallelism: normalize_parallelism(parallelism),
            batch_size: normalize_batch_size(batch_size),
            write_timeout: None,
        }
    }

    /// Create from the `[general]` config section
    pub fn from_general(general: &GeneralConfig) -> Self {
        Self::new(general.parallelism, general.batch_size).with_write_timeout(general.write_timeout())
    }

    /// Set the per-write timeout
    pub fn with_write_timeout(mut self, write_timeout: Option<Duration>) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    fn normalized(self) -> Self {
        Self {
            parallelism: self.parallelism.max(1),
            batch_size: if self.batch_size == 0 {
                DEFAULT_BATCH_SIZE
            } else {
                self.batch_size
            },
            ..self
        }
    }
}

/// One completed drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainRecord {
    /// Frames admitted when the drain ran
    pub admitted: u64,
    /// Outcomes collected by the drain
    pub drained: usize,
}

/// Result of one write task
struct WriteOutcome {
    ticket: DispatchTicket,
    result: Result<(), ContractError>,
}

/// The bounded-concurrency dispatch engine
///
/// One controlling task calls `submit`/`drain`/`finalize` sequentially; each
/// admitted frame is written by its own tokio task.
pub struct DispatchEngine<W> {
    backend: Arc<W>,
    gate: AdmissionGate,
    accumulator: Arc<ResultAccumulator>,
    config: EngineConfig,
    /// Completion queue, yields outcomes in completion order
    in_flight: JoinSet<WriteOutcome>,
    /// Admitted but not yet drained
    pending: usize,
    peak_pending: usize,
    admitted: u64,
    drain_history: Vec<DrainRecord>,
    stats: DispatchStatsAggregator,
}

impl<W> DispatchEngine<W>
where
    W: WriterBackend + Sync + 'static,
{
    /// Create an engine writing to `backend` and counting into `accumulator`
    pub fn new(backend: Arc<W>, accumulator: Arc<ResultAccumulator>, config: EngineConfig) -> Self {
        let config = config.normalized();
        Self {
            backend,
            gate: AdmissionGate::new(config.parallelism),
            accumulator,
            config,
            in_flight: JoinSet::new(),
            pending: 0,
            peak_pending: 0,
            admitted: 0,
            drain_history: Vec::new(),
            stats: DispatchStatsAggregator::new(),
        }
    }

    /// Effective configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared result accumulator
    pub fn accumulator(&self) -> &Arc<ResultAccumulator> {
        &self.accumulator
    }

    /// Admitted frames not yet drained
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Highest `pending` value observed
    pub fn peak_pending(&self) -> usize {
        self.peak_pending
    }

    /// Frames admitted so far
    pub fn admitted(&self) -> u64 {
        self.admitted
    }

    /// Writes currently holding a gate slot
    pub fn in_flight(&self) -> usize {
        self.gate.in_use()
    }

    /// Every drain performed so far, oldest first
    pub fn drain_history(&self) -> &[DrainRecord] {
        &self.drain_history
    }

    /// Write latency / drain size statistics
    pub fn stats(&self) -> DispatchStatsSummary {
        self.stats.summary()
    }

    /// Admit one frame and start its write
    ///
    /// Waits while the gate is full. Returns once the write has started, not
    /// when it finishes, unless this admission filled the batch, in which case
    /// everything pending is drained first.
    ///
    /// # Errors
    /// Returns `DispatcherError::GateClosed` once the engine has been finalized
    pub async fn submit(&mut self, frame: DataFrame) -> Result<(), DispatcherError> {
        let permit = self.gate.acquire().await?;

        let mut ticket = DispatchTicket::admitted(self.admitted);
        self.admitted += 1;
        self.pending += 1;
        self.peak_pending = self.peak_pending.max(self.pending);

        let backend = Arc::clone(&self.backend);
        let write_timeout = self.config.write_timeout;
        self.in_flight.spawn(async move {
            if let Err(e) = ticket.start_writing() {
                error!(error = %e, "Ticket state corrupted");
            }

            let result = match write_timeout {
                Some(limit) => match tokio::time::timeout(limit, backend.write_frame(&frame)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(ContractError::WriteTimeout {
                        backend: backend.name().to_string(),
                        timeout_ms: limit.as_millis() as u64,
                    }),
                },
                None => backend.write_frame(&frame).await,
            };

            // Slot frees as soon as the write is done, not when it is drained
            permit.release();

            if let Err(e) = ticket.complete(result.is_ok()) {
                error!(error = %e, "Ticket state corrupted");
            }
            WriteOutcome { ticket, result }
        });
        record_writes_in_flight(self.gate.in_use());

        if self.pending >= self.config.batch_size {
            self.drain(self.pending).await?;
        }
        Ok(())
    }

    /// Wait for exactly `n` outcomes and count them
    ///
    /// # Errors
    /// Returns `DispatcherError::DrainOverrun` if `n` exceeds `pending`
    #[instrument(
        name = "dispatch_engine_drain",
        skip(self),
        fields(backend = %self.backend.name(), pending = self.pending)
    )]
    pub async fn drain(&mut self, n: usize) -> Result<usize, DispatcherError> {
        if n > self.pending {
            return Err(DispatcherError::DrainOverrun {
                requested: n,
                pending: self.pending,
            });
        }
        if n == 0 {
            return Ok(0);
        }

        for drained in 0..n {
            match self.in_flight.join_next().await {
                Some(Ok(outcome)) => self.fold(outcome),
                Some(Err(e)) => {
                    // Panicked or aborted write task: still exactly one count
                    error!(backend = %self.backend.name(), error = %e, "Write task failed");
                    self.accumulator.record_failure();
                    record_frame_written(self.backend.name(), false, 0.0);
                }
                None => {
                    let pending = self.pending;
                    self.pending = 0;
                    return Err(DispatcherError::DrainOverrun {
                        requested: n - drained,
                        pending,
                    });
                }
            }
            self.pending -= 1;
        }

        self.drain_history.push(DrainRecord {
            admitted: self.admitted,
            drained: n,
        });
        self.stats.record_drain(n);
        record_drain(n);
        debug!(
            drained = n,
            admitted = self.admitted,
            succeeded = self.accumulator.succeeded(),
            failed = self.accumulator.failed(),
            "Drain complete"
        );
        Ok(n)
    }

    /// Drain everything pending (end of an input burst)
    pub async fn end_burst(&mut self) -> Result<usize, DispatcherError> {
        self.drain(self.pending).await
    }

    /// Drain everything still pending and return the final counts
    ///
    /// Closes the gate: later `submit` calls fail with `GateClosed`.
    #[instrument(name = "dispatch_engine_finalize", skip(self))]
    pub async fn finalize(&mut self) -> Result<RunSummary, DispatcherError> {
        self.drain(self.pending).await?;
        self.gate.close();
        record_writes_in_flight(0);

        let summary = self.accumulator.snapshot();
        info!(
            admitted = self.admitted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            drains = self.drain_history.len(),
            peak_pending = self.peak_pending,
            "Dispatch finalized"
        );
        Ok(summary)
    }

    fn fold(&mut self, outcome: WriteOutcome) {
        let WriteOutcome { mut ticket, result } = outcome;
        if let Err(e) = ticket.drain() {
            error!(error = %e, "Ticket drained out of order");
        }

        let latency_ms = ticket
            .write_time()
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or_default();
        let timed_out = matches!(result, Err(ContractError::WriteTimeout { .. }));
        self.stats.record_write(latency_ms, timed_out);
        record_frame_written(self.backend.name(), result.is_ok(), latency_ms);

        match result {
            Ok(()) => self.accumulator.record_success(),
            Err(e) => {
                warn!(
                    backend = %self.backend.name(),
                    seq = ticket.seq(),
                    error = %e,
                    "Write failed"
                );
                self.accumulator.record_failure();
            }
        }
    }
}
