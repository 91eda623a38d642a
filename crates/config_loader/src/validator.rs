//! 配置校验模块
//!
//! 校验规则：
//! - 字段级规则 (validator derive)
//! - 选中的存储后端必须有对应配置段
//! - network.addr 必须是合法的 host:port
//! - log_level 必须是已知级别

use contracts::{BackendKind, CollectorConfig, ContractError};
use validator::Validate;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 校验 CollectorConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &CollectorConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_backend_section(config)?;
    validate_network_addr(config)?;
    validate_log_level(config)?;
    Ok(())
}

/// 字段级校验
fn validate_fields(config: &CollectorConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|e| ContractError::config_validation("fields", e.to_string()))
}

/// 校验后端配置段存在
fn validate_backend_section(config: &CollectorConfig) -> Result<(), ContractError> {
    let missing = match config.general.storage_backend {
        Some(BackendKind::File) => config.file.is_none(),
        Some(BackendKind::Network) => config.network.is_none(),
        Some(BackendKind::Log) | None => false,
    };

    if missing {
        let kind = config
            .general
            .storage_backend
            .map(|k| k.as_str())
            .unwrap_or_default();
        return Err(ContractError::config_validation(
            "general.storage_backend",
            format!("backend '{kind}' selected but the [{kind}] section is missing"),
        ));
    }
    Ok(())
}

/// 校验网络地址格式
fn validate_network_addr(config: &CollectorConfig) -> Result<(), ContractError> {
    let Some(network) = &config.network else {
        return Ok(());
    };

    let valid = network
        .addr
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());

    if !valid {
        return Err(ContractError::config_validation(
            "network.addr",
            format!("expected host:port, got '{}'", network.addr),
        ));
    }
    Ok(())
}

/// 校验日志级别
fn validate_log_level(config: &CollectorConfig) -> Result<(), ContractError> {
    let Some(level) = &config.general.log_level else {
        return Ok(());
    };

    if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        return Err(ContractError::config_validation(
            "general.log_level",
            format!("unknown log level '{level}'"),
        ));
    }
    Ok(())
}
