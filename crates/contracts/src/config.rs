//! CollectorConfig - Config Loader output
//!
//! 描述完整的采集配置：并发度、批大小、存储后端、输入格式、日志。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Default number of concurrent writes
pub const DEFAULT_PARALLELISM: usize = 1;

/// Default number of admitted frames between drains
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Clamp a configured parallelism to a usable value (`<= 0` → 1)
pub fn normalize_parallelism(value: i64) -> usize {
    if value > 0 {
        usize::try_from(value).unwrap_or(usize::MAX)
    } else {
        DEFAULT_PARALLELISM
    }
}

/// Clamp a configured batch size to a usable value (`<= 0` → 1000)
pub fn normalize_batch_size(value: i64) -> usize {
    if value > 0 {
        usize::try_from(value).unwrap_or(usize::MAX)
    } else {
        DEFAULT_BATCH_SIZE
    }
}

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete collector configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CollectorConfig {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// General settings
    #[serde(default)]
    #[validate(nested)]
    pub general: GeneralConfig,

    /// File backend settings
    #[serde(default)]
    #[validate(nested)]
    pub file: Option<FileBackendConfig>,

    /// Network backend settings (remote time-series endpoint)
    #[serde(default)]
    #[validate(nested)]
    pub network: Option<NetworkBackendConfig>,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeneralConfig {
    /// Writes to execute in parallel (`<= 0` → 1)
    #[serde(default = "default_parallelism")]
    pub parallelism: i64,

    /// Admitted frames between two drains (`<= 0` → 1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,

    /// Which backend to construct; absent means nothing to do
    #[serde(default)]
    pub storage_backend: Option<BackendKind>,

    /// Wire format of input blocks
    #[serde(default)]
    pub input_format: InputFormat,

    /// Default log level when neither RUST_LOG nor CLI flags set one
    #[serde(default)]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Per-write timeout in milliseconds (0 = none)
    #[serde(default)]
    pub write_timeout_ms: u64,

    /// Prometheus exporter port (0 = disabled)
    #[serde(default)]
    pub metrics_port: u16,
}

fn default_parallelism() -> i64 {
    DEFAULT_PARALLELISM as i64
}

fn default_batch_size() -> i64 {
    DEFAULT_BATCH_SIZE as i64
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            batch_size: default_batch_size(),
            storage_backend: None,
            input_format: InputFormat::default(),
            log_level: None,
            log_file: None,
            write_timeout_ms: 0,
            metrics_port: 0,
        }
    }
}

impl GeneralConfig {
    /// Parallelism after clamping
    pub fn effective_parallelism(&self) -> usize {
        normalize_parallelism(self.parallelism)
    }

    /// Batch size after clamping
    pub fn effective_batch_size(&self) -> usize {
        normalize_batch_size(self.batch_size)
    }

    /// Per-write timeout, if any
    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// Prometheus port, if enabled
    pub fn metrics_port(&self) -> Option<u16> {
        (self.metrics_port > 0).then_some(self.metrics_port)
    }
}

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Append frames to a local file
    File,
    /// Stream frames to a remote endpoint
    Network,
    /// Log frame summaries only
    Log,
}

impl BackendKind {
    /// Config section / display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Network => "network",
            Self::Log => "log",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "network" => Ok(Self::Network),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Input block wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// bincode-encoded `DataBurst`
    #[default]
    Bincode,
    /// JSON-encoded `DataBurst`
    Json,
}

/// File backend settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileBackendConfig {
    /// Output file, frames are appended as JSON lines
    #[validate(length(min = 1, message = "data_frame_file cannot be empty"))]
    pub data_frame_file: String,
}

/// Network backend settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NetworkBackendConfig {
    /// Target address (`host:port`)
    #[validate(length(min = 1, message = "addr cannot be empty"))]
    pub addr: String,

    /// Serialization format
    #[serde(default)]
    pub format: WireFormat,

    /// Origin tag stamped on every datagram
    #[serde(default)]
    #[validate(length(min = 1, message = "origin cannot be empty"))]
    pub origin: Option<String>,

    /// Max datagram size (UDP limit is 65507 for IPv4)
    #[serde(default = "default_max_packet_size")]
    #[validate(range(min = 1, max = 65507))]
    pub max_packet_size: usize,
}

fn default_max_packet_size() -> usize {
    65000
}

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_non_positive() {
        assert_eq!(normalize_parallelism(0), 1);
        assert_eq!(normalize_parallelism(-4), 1);
        assert_eq!(normalize_parallelism(8), 8);
        assert_eq!(normalize_batch_size(0), 1000);
        assert_eq!(normalize_batch_size(-1), 1000);
        assert_eq!(normalize_batch_size(3), 3);
    }

    #[test]
    fn test_normalize_large_values() {
        let expected = usize::try_from(i64::MAX).unwrap_or(usize::MAX);
        assert_eq!(normalize_parallelism(i64::MAX), expected);
        assert_eq!(normalize_batch_size(i64::MAX), expected);
    }

    #[test]
    fn test_general_defaults() {
        let general: GeneralConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(general.effective_parallelism(), 1);
        assert_eq!(general.effective_batch_size(), 1000);
        assert_eq!(general.storage_backend, None);
        assert_eq!(general.input_format, InputFormat::Bincode);
        assert!(general.write_timeout().is_none());
        assert!(general.metrics_port().is_none());
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("File".parse::<BackendKind>(), Ok(BackendKind::File));
        assert_eq!("network".parse::<BackendKind>(), Ok(BackendKind::Network));
        assert!("vaultaire".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_network_validation() {
        let config = NetworkBackendConfig {
            addr: "127.0.0.1:5560".to_string(),
            format: WireFormat::Json,
            origin: Some(String::new()),
            max_packet_size: 65000,
        };
        assert!(config.validate().is_err());
    }
}
