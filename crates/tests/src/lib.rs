//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置加载快照测试
//! - 端到端分发场景（内存后端）
//! - 计数与并发上限性质检查

#[cfg(test)]
mod contract_tests {
    use contracts::{BackendKind, ConfigVersion, InputFormat, WireFormat};

    #[test]
    fn test_full_config_loads() {
        let toml = r#"
            [general]
            parallelism = 4
            batch_size = 250
            storage_backend = "network"
            input_format = "json"
            log_level = "debug"
            write_timeout_ms = 500

            [network]
            addr = "127.0.0.1:5560"
            format = "bincode"
            origin = "ABCDEF"
        "#;
        let config = config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
            .unwrap();

        assert_eq!(config.version, ConfigVersion::V1);
        assert_eq!(config.general.effective_parallelism(), 4);
        assert_eq!(config.general.effective_batch_size(), 250);
        assert_eq!(config.general.storage_backend, Some(BackendKind::Network));
        assert_eq!(config.general.input_format, InputFormat::Json);
        let network = config.network.unwrap();
        assert_eq!(network.format, WireFormat::Bincode);
        assert_eq!(network.max_packet_size, 65000);
    }

    #[test]
    fn test_selected_backend_requires_section() {
        let toml = r#"
            [general]
            storage_backend = "file"
        "#;
        let result =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml);
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    use contracts::{ContractError, DataBurst, DataFrame, FramePayload, WriterBackend};
    use dispatcher::{Collector, DispatchEngine, DrainRecord, EngineConfig, FileWriter, ResultAccumulator};
    use ingestion::{BincodeBurstDecoder, BurstDecoder};

    /// Outcome script for the instrumented backend
    #[derive(Clone, Copy)]
    enum Script {
        AlwaysSucceed,
        AlwaysFail,
        /// Call 0 succeeds, call 1 fails, ...
        Alternate,
    }

    /// In-memory backend recording call order and concurrency
    struct InstrumentedBackend {
        script: Script,
        delay: Duration,
        calls: AtomicU64,
        current: AtomicUsize,
        peak: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    impl InstrumentedBackend {
        fn new(script: Script) -> Self {
            Self::with_delay(script, Duration::ZERO)
        }

        fn with_delay(script: Script, delay: Duration) -> Self {
            Self {
                script,
                delay,
                calls: AtomicU64::new(0),
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                shutdowns: AtomicUsize::new(0),
            }
        }
    }

    impl WriterBackend for InstrumentedBackend {
        fn name(&self) -> &str {
            "instrumented"
        }

        async fn write_frame(&self, _frame: &DataFrame) -> Result<(), ContractError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if self.delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.delay).await;
            }
            self.current.fetch_sub(1, Ordering::SeqCst);

            let ok = match self.script {
                Script::AlwaysSucceed => true,
                Script::AlwaysFail => false,
                Script::Alternate => call % 2 == 0,
            };
            if ok {
                Ok(())
            } else {
                Err(ContractError::backend_write("instrumented", format!("scripted failure #{call}")))
            }
        }

        async fn shutdown(&self) -> Result<(), ContractError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn frames(n: u64) -> Vec<DataFrame> {
        (0..n)
            .map(|i| DataFrame::new(i, FramePayload::Number(i)).with_tag("series", "s1"))
            .collect()
    }

    fn engine(
        backend: &Arc<InstrumentedBackend>,
        parallelism: i64,
        batch_size: i64,
    ) -> DispatchEngine<InstrumentedBackend> {
        DispatchEngine::new(
            Arc::clone(backend),
            Arc::new(ResultAccumulator::new()),
            EngineConfig::new(parallelism, batch_size),
        )
    }

    /// parallelism 2, batch 3, 7 frames, always success
    #[tokio::test]
    async fn test_scenario_small_batches() {
        let backend = Arc::new(InstrumentedBackend::new(Script::AlwaysSucceed));
        let mut engine = engine(&backend, 2, 3);
        for frame in frames(7) {
            engine.submit(frame).await.unwrap();
        }
        let summary = engine.finalize().await.unwrap();

        assert_eq!(summary.succeeded, 7);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            engine.drain_history(),
            &[
                DrainRecord { admitted: 3, drained: 3 },
                DrainRecord { admitted: 6, drained: 3 },
                DrainRecord { admitted: 7, drained: 1 },
            ]
        );
    }

    /// parallelism 1, batch 1000, alternating outcomes, 10 frames
    #[tokio::test]
    async fn test_scenario_alternating_serial() {
        let backend = Arc::new(InstrumentedBackend::new(Script::Alternate));
        let mut engine = engine(&backend, 1, 1000);
        for frame in frames(10) {
            engine.submit(frame).await.unwrap();
        }
        let summary = engine.finalize().await.unwrap();

        assert_eq!(summary.succeeded, 5);
        assert_eq!(summary.failed, 5);
        assert_eq!(backend.peak.load(Ordering::SeqCst), 1);
    }

    /// two sources: first undecodable, second holds 4 frames
    #[tokio::test]
    async fn test_scenario_decode_failure_then_good_source() {
        let backend = Arc::new(InstrumentedBackend::new(Script::AlwaysSucceed));
        let decoder = Arc::new(BincodeBurstDecoder);
        let good = decoder.encode(&DataBurst::new(frames(4))).unwrap();

        let mut collector = Collector::new(
            Arc::clone(&backend),
            decoder.clone() as Arc<dyn BurstDecoder>,
            EngineConfig::default(),
        );
        collector.ingest_block("corrupt.bin", &[0x01]).await.unwrap();
        collector.ingest_block("good.bin", &good).await.unwrap();

        let report = collector.finalize().await.unwrap();
        assert_eq!(report.summary.succeeded, 4);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.decode_errors, 1);

        collector.shutdown().await.unwrap();
        assert_eq!(backend.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_frame_counted_once() {
        for (parallelism, batch_size) in [(1, 1), (1, 5), (2, 3), (4, 4), (5, 2), (8, 1000), (0, 0), (-3, -3)] {
            for n in [0u64, 1, 9, 40] {
                let backend = Arc::new(InstrumentedBackend::new(Script::Alternate));
                let mut engine = engine(&backend, parallelism, batch_size);
                for frame in frames(n) {
                    engine.submit(frame).await.unwrap();
                    assert!(engine.pending() <= engine.config().batch_size);
                }
                let summary = engine.finalize().await.unwrap();

                assert_eq!(summary.total(), n, "p={parallelism} b={batch_size} n={n}");
                assert_eq!(summary.failed, n / 2, "p={parallelism} b={batch_size} n={n}");
                assert_eq!(backend.calls.load(Ordering::SeqCst), n);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bounded_by_parallelism() {
        for parallelism in [1usize, 2, 4] {
            let backend = Arc::new(InstrumentedBackend::with_delay(
                Script::AlwaysSucceed,
                Duration::from_millis(3),
            ));
            let mut engine = engine(&backend, parallelism as i64, 16);
            for frame in frames(32) {
                engine.submit(frame).await.unwrap();
            }
            engine.finalize().await.unwrap();

            let peak = backend.peak.load(Ordering::SeqCst);
            assert!(peak <= parallelism, "peak {peak} > parallelism {parallelism}");
            assert_eq!(engine.in_flight(), 0);
        }
    }

    #[tokio::test]
    async fn test_always_failing_backend_does_not_stall() {
        let backend = Arc::new(InstrumentedBackend::new(Script::AlwaysFail));
        let mut engine = engine(&backend, 3, 4);
        let run = async {
            for frame in frames(25) {
                engine.submit(frame).await.unwrap();
            }
            engine.finalize().await.unwrap()
        };
        let summary = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("dispatch stalled");

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 25);
    }

    #[tokio::test]
    async fn test_file_backend_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("burst.bin");
        let output = dir.path().join("out/frames.jsonl");
        std::fs::write(&input, BincodeBurstDecoder.encode(&DataBurst::new(frames(12))).unwrap())
            .unwrap();

        let backend = Arc::new(FileWriter::new("file", &output).unwrap());
        let mut collector = Collector::new(
            Arc::clone(&backend),
            Arc::new(BincodeBurstDecoder),
            EngineConfig::new(4, 5),
        );
        let mut sources = ingestion::open_sources(&[input]).await.unwrap();
        for source in sources.iter_mut() {
            let block = source.read_block().await.unwrap();
            collector.ingest_block(source.name(), &block).await.unwrap();
        }
        let report = collector.finalize().await.unwrap();
        collector.shutdown().await.unwrap();

        assert_eq!(report.summary.frames_written(), 12);
        let content = std::fs::read_to_string(&output).unwrap();
        let mut timestamps: Vec<u64> = content
            .lines()
            .map(|line| serde_json::from_str::<DataFrame>(line).unwrap().timestamp)
            .collect();
        timestamps.sort_unstable();
        assert_eq!(timestamps, (0..12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.bin");
        std::fs::write(&present, b"").unwrap();
        let missing = dir.path().join("missing.bin");

        let result = ingestion::open_sources(&[present, missing]).await;
        assert!(result.is_err());
    }
}
