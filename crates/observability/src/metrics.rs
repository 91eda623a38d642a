//! 分发指标收集模块
//!
//! 记录写入结果、排空批次和解码错误，并在内存中聚合统计。

use metrics::{counter, gauge, histogram};

/// 记录单帧写入结果
///
/// 每个被排空的写入结果调用一次。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_frame_written;
///
/// record_frame_written("file", outcome.is_ok(), latency_ms);
/// ```
pub fn record_frame_written(backend: &str, success: bool, latency_ms: f64) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "frame_collector_frames_written_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "frame_collector_write_latency_ms",
        "backend" => backend.to_string()
    )
    .record(latency_ms);
}

/// 记录一次排空
pub fn record_drain(size: usize) {
    counter!("frame_collector_drains_total").increment(1);
    histogram!("frame_collector_drain_size").record(size as f64);
}

/// 记录当前在途写入数
pub fn record_writes_in_flight(in_flight: usize) {
    gauge!("frame_collector_writes_in_flight").set(in_flight as f64);
}

/// 记录解码失败
pub fn record_decode_error(decoder: &str) {
    counter!(
        "frame_collector_decode_errors_total",
        "decoder" => decoder.to_string()
    )
    .increment(1);
}

/// 记录一个输入块解码出的帧数
pub fn record_burst_decoded(frames: usize) {
    counter!("frame_collector_bursts_total").increment(1);
    histogram!("frame_collector_burst_frames").record(frames as f64);
}

/// 分发指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。只由控制流程更新，无需加锁。
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// 写入延迟统计 (毫秒)
    pub write_latency_ms: RunningStats,

    /// 每次排空的帧数统计
    pub drain_sizes: RunningStats,

    /// 超时失败次数
    pub timeouts: u64,
}

impl DispatchStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次写入
    pub fn record_write(&mut self, latency_ms: f64, timed_out: bool) {
        self.write_latency_ms.push(latency_ms);
        if timed_out {
            self.timeouts += 1;
        }
    }

    /// 记录一次排空
    pub fn record_drain(&mut self, size: usize) {
        self.drain_sizes.push(size as f64);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DispatchStatsSummary {
        DispatchStatsSummary {
            write_latency_ms: StatsSummary::from(&self.write_latency_ms),
            drain_size: StatsSummary::from(&self.drain_sizes),
            timeouts: self.timeouts,
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsSummary {
    pub write_latency_ms: StatsSummary,
    pub drain_size: StatsSummary,
    pub timeouts: u64,
}

impl std::fmt::Display for DispatchStatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Metrics Summary ===")?;
        writeln!(f, "Write latency (ms): {}", self.write_latency_ms)?;
        writeln!(f, "Drain size: {}", self.drain_size)?;
        writeln!(f, "Timed-out writes: {}", self.timeouts)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DispatchStatsAggregator::new();

        aggregator.record_write(2.0, false);
        aggregator.record_write(4.0, true);
        aggregator.record_drain(3);
        aggregator.record_drain(1);

        let summary = aggregator.summary();
        assert_eq!(summary.write_latency_ms.count, 2);
        assert!((summary.write_latency_ms.mean - 3.0).abs() < 1e-10);
        assert_eq!(summary.drain_size.count, 2);
        assert!((summary.drain_size.max - 3.0).abs() < 1e-10);
        assert_eq!(summary.timeouts, 1);

        aggregator.reset();
        assert_eq!(aggregator.summary().drain_size.count, 0);
    }

    #[test]
    fn test_summary_display() {
        let summary = DispatchStatsSummary {
            write_latency_ms: StatsSummary {
                count: 100,
                min: 1.0,
                max: 9.0,
                mean: 5.0,
                std_dev: 2.0,
            },
            drain_size: StatsSummary::default(),
            timeouts: 0,
        };

        let output = format!("{}", summary);
        assert!(output.contains("mean=5.000"));
        assert!(output.contains("Drain size: N/A"));
    }

    #[test]
    fn test_recorders_without_installed_recorder() {
        // The metrics facade is a no-op until a recorder is installed
        record_frame_written("log", true, 0.5);
        record_drain(3);
        record_writes_in_flight(2);
        record_decode_error("bincode");
        record_burst_decoded(4);
    }
}
