//! Run statistics and summary output.

use std::time::Duration;

use dispatcher::CollectorReport;
use observability::DispatchStatsSummary;

/// Statistics from a collection run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames the backend accepted
    pub frames_written: u64,

    /// Frames whose write failed (including timeouts)
    pub frames_failed: u64,

    /// Input sources processed
    pub sources: usize,

    /// Sources that failed to decode
    pub decode_errors: usize,

    /// Sources that failed to read
    pub read_errors: usize,

    /// Wall time from engine start to final drain
    pub duration: Duration,

    /// Number of drains performed
    pub drains: usize,

    /// Highest number of admitted-but-undrained frames
    pub peak_pending: usize,

    /// Latency / drain size statistics
    pub dispatch: DispatchStatsSummary,
}

impl From<CollectorReport> for PipelineStats {
    fn from(report: CollectorReport) -> Self {
        Self {
            frames_written: report.summary.frames_written(),
            frames_failed: report.summary.failed,
            sources: report.sources,
            decode_errors: report.decode_errors,
            read_errors: report.read_errors,
            duration: report.summary.elapsed,
            drains: report.drains,
            peak_pending: report.peak_pending,
            dispatch: report.stats,
        }
    }
}

impl PipelineStats {
    /// Calculate frames per second throughput
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_written as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate failure rate as percentage
    pub fn failure_rate(&self) -> f64 {
        let total = self.frames_written + self.frames_failed;
        if total > 0 {
            (self.frames_failed as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Collection Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Frames written: {}", self.frames_written);
        println!("   ├─ Elapsed: {:.3}s", self.duration.as_secs_f64());
        println!("   ├─ Frames/s: {:.2}", self.fps());
        println!(
            "   ├─ Failed writes: {} ({:.2}%)",
            self.frames_failed,
            self.failure_rate()
        );
        println!("   ├─ Sources: {}", self.sources);
        println!("   ├─ Decode errors: {}", self.decode_errors);
        println!("   └─ Read errors: {}", self.read_errors);

        println!("\n📈 Dispatch");
        println!("   ├─ Drains: {}", self.drains);
        println!("   ├─ Peak pending: {}", self.peak_pending);
        println!("   ├─ Write latency (ms): {}", self.dispatch.write_latency_ms);
        println!("   ├─ Drain size: {}", self.dispatch.drain_size);
        println!("   └─ Timed-out writes: {}", self.dispatch.timeouts);

        println!();
    }
}
