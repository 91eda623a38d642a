//! CLI argument definitions using clap.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use contracts::BackendKind;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/frame-collector/collector.toml";

/// Frame Collector - bounded-concurrency frame ingestion and storage
#[derive(Parser, Debug)]
#[command(
    name = "frame-collector",
    author,
    version,
    about = "Bounded-concurrency frame collector",
    long_about = "Reads serialized frame bursts from files (or stdin), decodes them, and \n\
                  writes every frame to the configured storage backend with a fixed \n\
                  ceiling on concurrent writes."
)]
pub struct Cli {
    /// Path to configuration file (TOML or JSON); relative paths resolve against $HOME
    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_PATH,
        global = true,
        env = "FRAME_COLLECTOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FRAME_COLLECTOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FRAME_COLLECTOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect frames from the given files (or stdin) into the backend
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Input files, one burst per file (stdin when none given)
    pub files: Vec<PathBuf>,

    /// Override maximum concurrent writes (<= 0 means 1)
    #[arg(long, allow_negative_numbers = true, env = "FRAME_COLLECTOR_PARALLELISM")]
    pub parallelism: Option<i64>,

    /// Override frames admitted between drains (<= 0 means 1000)
    #[arg(long, allow_negative_numbers = true, env = "FRAME_COLLECTOR_BATCH_SIZE")]
    pub batch_size: Option<i64>,

    /// Override storage backend (file, network, log)
    #[arg(long, env = "FRAME_COLLECTOR_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Validate configuration and exit without collecting
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Resolve a relative config path against the user's home directory
pub fn resolve_config_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match dirs::home_dir() {
        Some(home) => home.join(path),
        None => path.to_path_buf(),
    }
}
