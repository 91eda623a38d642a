//! Writer backend implementations
//!
//! Contains FileWriter, NetworkWriter, and LogWriter.

mod file;
mod log;
mod network;

pub use self::file::FileWriter;
pub use self::log::LogWriter;
pub use self::network::{NetworkWriter, NetworkWriterConfig};

use contracts::{BackendKind, CollectorConfig, ContractError, DataFrame, WriterBackend};
use tracing::{info, instrument};

use crate::error::DispatcherError;

/// The backend selected by configuration
pub enum AnyBackend {
    File(FileWriter),
    Network(NetworkWriter),
    Log(LogWriter),
}

impl WriterBackend for AnyBackend {
    fn name(&self) -> &str {
        match self {
            Self::File(w) => w.name(),
            Self::Network(w) => w.name(),
            Self::Log(w) => w.name(),
        }
    }

    async fn write_frame(&self, frame: &DataFrame) -> Result<(), ContractError> {
        match self {
            Self::File(w) => w.write_frame(frame).await,
            Self::Network(w) => w.write_frame(frame).await,
            Self::Log(w) => w.write_frame(frame).await,
        }
    }

    async fn shutdown(&self) -> Result<(), ContractError> {
        match self {
            Self::File(w) => w.shutdown().await,
            Self::Network(w) => w.shutdown().await,
            Self::Log(w) => w.shutdown().await,
        }
    }
}

/// Build the backend named by `general.storage_backend`
///
/// Returns `Ok(None)` when no backend is configured.
///
/// # Errors
/// `DispatcherError::BackendCreation` if the backend section is missing or
/// the backend cannot be opened
#[instrument(name = "create_backend", skip(config))]
pub async fn create_backend(config: &CollectorConfig) -> Result<Option<AnyBackend>, DispatcherError> {
    let Some(kind) = config.general.storage_backend else {
        return Ok(None);
    };
    let name = kind.as_str();

    let backend = match kind {
        BackendKind::File => {
            let section = config
                .file
                .as_ref()
                .ok_or_else(|| DispatcherError::backend_creation(name, "missing [file] section"))?;
            let writer = FileWriter::from_config(name, section)
                .map_err(|e| DispatcherError::backend_creation(name, e.to_string()))?;
            AnyBackend::File(writer)
        }
        BackendKind::Network => {
            let section = config.network.as_ref().ok_or_else(|| {
                DispatcherError::backend_creation(name, "missing [network] section")
            })?;
            let writer = NetworkWriter::from_config(name, section)
                .await
                .map_err(|e| DispatcherError::backend_creation(name, e.to_string()))?;
            AnyBackend::Network(writer)
        }
        BackendKind::Log => AnyBackend::Log(LogWriter::new(name)),
    };

    info!(backend = name, "Backend created");
    Ok(Some(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FileBackendConfig, FramePayload, NetworkBackendConfig, WireFormat};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_no_backend_configured() {
        let config = CollectorConfig::default();
        assert!(create_backend(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_file_backend() {
        let dir = tempdir().unwrap();
        let mut config = CollectorConfig::default();
        config.general.storage_backend = Some(BackendKind::File);
        config.file = Some(FileBackendConfig {
            data_frame_file: dir.path().join("frames.jsonl").display().to_string(),
        });

        let backend = create_backend(&config).await.unwrap().unwrap();
        assert_eq!(backend.name(), "file");
        backend
            .write_frame(&DataFrame::new(1, FramePayload::Empty))
            .await
            .unwrap();
        backend.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_section_is_creation_error() {
        let mut config = CollectorConfig::default();
        config.general.storage_backend = Some(BackendKind::File);
        let err = create_backend(&config).await.err().unwrap();
        assert!(matches!(err, DispatcherError::BackendCreation { .. }));
    }

    #[tokio::test]
    async fn test_unresolvable_network_addr() {
        let mut config = CollectorConfig::default();
        config.general.storage_backend = Some(BackendKind::Network);
        config.network = Some(NetworkBackendConfig {
            addr: "not an address".to_string(),
            format: WireFormat::Json,
            origin: None,
            max_packet_size: 65000,
        });
        let err = create_backend(&config).await.err().unwrap();
        assert!(matches!(err, DispatcherError::BackendCreation { .. }));
    }

    #[tokio::test]
    async fn test_create_log_backend() {
        let mut config = CollectorConfig::default();
        config.general.storage_backend = Some(BackendKind::Log);
        let backend = create_backend(&config).await.unwrap().unwrap();
        assert_eq!(backend.name(), "log");
    }
}
