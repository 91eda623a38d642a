//! `run` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::CollectorConfig;
use dispatcher::{EngineConfig, create_backend};
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_collector(args: &RunArgs, mut config: CollectorConfig) -> Result<()> {
    apply_overrides(args, &mut config);

    info!(
        backend = config.general.storage_backend.map(|b| b.as_str()).unwrap_or("none"),
        parallelism = config.general.effective_parallelism(),
        batch_size = config.general.effective_batch_size(),
        input_format = ?config.general.input_format,
        inputs = args.files.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    // Backend first: construction failures are fatal before any input is touched
    let Some(backend) = create_backend(&config)
        .await
        .context("Failed to create storage backend")?
    else {
        info!("No backend specified, nothing to collect");
        return Ok(());
    };

    let sources = ingestion::open_sources(&args.files)
        .await
        .context("Failed to open input sources")?;

    if let Some(port) = config.general.metrics_port() {
        observability::init_metrics_only(port)?;
        info!("Metrics endpoint available on port {}", port);
    }

    let pipeline = Pipeline::new(PipelineConfig {
        engine: EngineConfig::from_general(&config.general),
        input_format: config.general.input_format,
    });
    let stats = pipeline.run(Arc::new(backend), sources).await?;

    info!(
        frames_written = stats.frames_written,
        frames_failed = stats.frames_failed,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Frame collector finished"
    );
    Ok(())
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(args: &RunArgs, config: &mut CollectorConfig) {
    if let Some(parallelism) = args.parallelism {
        info!(parallelism, "Overriding parallelism from CLI");
        config.general.parallelism = parallelism;
    }
    if let Some(batch_size) = args.batch_size {
        info!(batch_size, "Overriding batch size from CLI");
        config.general.batch_size = batch_size;
    }
    if let Some(backend) = args.backend {
        info!(backend = backend.as_str(), "Overriding storage backend from CLI");
        config.general.storage_backend = Some(backend);
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &CollectorConfig) {
    let general = &config.general;
    println!("\n=== Configuration Summary ===\n");
    println!("General:");
    println!("  Parallelism: {}", general.effective_parallelism());
    println!("  Batch size: {}", general.effective_batch_size());
    println!("  Input format: {:?}", general.input_format);
    match general.write_timeout() {
        Some(timeout) => println!("  Write timeout: {}ms", timeout.as_millis()),
        None => println!("  Write timeout: none"),
    }

    match general.storage_backend {
        Some(kind) => println!("\nBackend: {}", kind.as_str()),
        None => println!("\nBackend: none (run will exit without collecting)"),
    }
    if let Some(ref file) = config.file {
        println!("  File: {}", file.data_frame_file);
    }
    if let Some(ref network) = config.network {
        println!("  Network: {} ({:?})", network.addr, network.format);
        if let Some(ref origin) = network.origin {
            println!("  Origin: {}", origin);
        }
    }

    println!();
}
