//! Run-scoped result accounting

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Success/failure counters for one run
///
/// Shared behind an `Arc`; every counter update is atomic. The engine folds an
/// outcome in only when it drains it, so `succeeded + failed` always equals the
/// number of drained frames.
#[derive(Debug)]
pub struct ResultAccumulator {
    /// Drained writes that succeeded
    succeeded: AtomicU64,
    /// Drained writes that failed
    failed: AtomicU64,
    /// Run start
    started: Instant,
}

impl Default for ResultAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAccumulator {
    /// Create a new accumulator; the run clock starts now
    pub fn new() -> Self {
        Self {
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Count one successful write
    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one failed write
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Successful writes so far
    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    /// Failed writes so far
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Frames counted so far
    pub fn counted(&self) -> u64 {
        self.succeeded() + self.failed()
    }

    /// Time since the accumulator was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            succeeded: self.succeeded(),
            failed: self.failed(),
            elapsed: self.elapsed(),
        }
    }
}

/// Snapshot of run counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Frames written successfully
    pub fn frames_written(&self) -> u64 {
        self.succeeded
    }

    /// All counted frames
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Elapsed run time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Successful writes per second
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.elapsed_secs();
        if secs > 0.0 {
            self.succeeded as f64 / secs
        } else {
            0.0
        }
    }

    /// Failure rate as percentage
    pub fn failure_rate(&self) -> f64 {
        let total = self.total();
        if total > 0 {
            (self.failed as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters() {
        let acc = ResultAccumulator::new();
        acc.record_success();
        acc.record_success();
        acc.record_failure();

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.succeeded, 2);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.total(), 3);
        assert_eq!(acc.counted(), 3);
    }

    #[test]
    fn test_concurrent_updates() {
        let acc = Arc::new(ResultAccumulator::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let acc = Arc::clone(&acc);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        if i % 2 == 0 {
                            acc.record_success();
                        } else {
                            acc.record_failure();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(acc.succeeded(), 4000);
        assert_eq!(acc.failed(), 4000);
    }

    #[test]
    fn test_rates() {
        let summary = RunSummary {
            succeeded: 30,
            failed: 10,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(summary.frames_written(), 30);
        assert!((summary.frames_per_second() - 15.0).abs() < 1e-9);
        assert!((summary.failure_rate() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_rate() {
        let summary = RunSummary::default();
        assert_eq!(summary.frames_per_second(), 0.0);
        assert_eq!(summary.failure_rate(), 0.0);
    }
}
