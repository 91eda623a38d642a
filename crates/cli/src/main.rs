//! # Frame Collector CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 输入源读取、解码与分发
//! - 运行结果汇总

mod cli;
mod commands;
mod error;
mod pipeline;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use contracts::CollectorConfig;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_collector, run_validate};
use error::CliError;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli::resolve_config_path(&cli.config);
    let loaded = load_config(&config_path);

    init_logging(&cli, loaded.as_ref().ok())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "Frame collector starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => match loaded {
            Ok(config) => run_collector(args, config).await,
            Err(e) => Err(e.into()),
        },
        Commands::Validate(args) => run_validate(args, &config_path, loaded),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

fn load_config(path: &Path) -> error::Result<CollectorConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    config_loader::ConfigLoader::load_from_path(path)
        .map_err(|source| CliError::config_load(path.display().to_string(), source))
}

/// Initialize logging from CLI flags, falling back to `[general]` settings
fn init_logging(cli: &Cli, config: Option<&CollectorConfig>) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn".to_string()
    } else {
        match cli.verbose {
            0 => config
                .and_then(|c| c.general.log_level.clone())
                .unwrap_or_else(|| "info".to_string()),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level,
        log_file: config.and_then(|c| c.general.log_file.clone()),
    })
}
