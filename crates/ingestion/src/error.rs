//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 输入文件无法打开
    #[error("couldn't open input '{source_name}': {source}")]
    OpenFailed {
        /// 输入源名称
        source_name: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 输入源读取失败
    #[error("failed to read input '{source_name}': {source}")]
    ReadFailed {
        /// 输入源名称
        source_name: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 输入源已被读取
    #[error("input '{source_name}' was already consumed")]
    AlreadyConsumed {
        /// 输入源名称
        source_name: String,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
