//! `validate` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{BackendKind, CollectorConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    backend: Option<String>,
    parallelism: usize,
    batch_size: usize,
    input_format: String,
}

/// Execute the `validate` command
pub fn run_validate(
    args: &ValidateArgs,
    config_path: &Path,
    loaded: crate::error::Result<CollectorConfig>,
) -> Result<()> {
    info!(config = %config_path.display(), "Validating configuration");

    let result = validation_result(config_path, loaded);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::validation_failed(result.config_path).into())
    }
}

fn validation_result(
    config_path: &Path,
    loaded: crate::error::Result<CollectorConfig>,
) -> ValidationResult {
    let config_path = config_path.display().to_string();

    match loaded {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    backend: config
                        .general
                        .storage_backend
                        .map(|b| b.as_str().to_string()),
                    parallelism: config.general.effective_parallelism(),
                    batch_size: config.general.effective_batch_size(),
                    input_format: format!("{:?}", config.general.input_format),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &CollectorConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let general = &config.general;

    if general.storage_backend.is_none() {
        warnings.push("No storage_backend configured - run will exit without collecting".to_string());
    }

    if general.parallelism <= 0 {
        warnings.push(format!(
            "general.parallelism = {} - writes will run serially",
            general.parallelism
        ));
    }

    if general.effective_batch_size() < general.effective_parallelism() {
        warnings.push(format!(
            "general.batch_size ({}) is below parallelism ({}) - concurrency is capped by the batch",
            general.effective_batch_size(),
            general.effective_parallelism()
        ));
    }

    if general.storage_backend == Some(BackendKind::Network)
        && config.network.as_ref().is_some_and(|n| n.origin.is_none())
    {
        warnings.push("network.origin is not set - datagrams carry no origin".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!(
                "  Backend: {}",
                summary.backend.as_deref().unwrap_or("none")
            );
            println!("  Parallelism: {}", summary.parallelism);
            println!("  Batch size: {}", summary.batch_size);
            println!("  Input format: {}", summary.input_format);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
