//! LogWriter - logs frame summary via tracing

use contracts::{ContractError, DataFrame, WriterBackend};
use tracing::{info, instrument};

/// Backend that logs frame summaries for debugging
pub struct LogWriter {
    name: String,
}

impl LogWriter {
    /// Create a new LogWriter with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl WriterBackend for LogWriter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_writer_write", skip(self, frame), fields(backend = %self.name))]
    async fn write_frame(&self, frame: &DataFrame) -> Result<(), ContractError> {
        info!(
            backend = %self.name,
            source = %frame.source_key(),
            timestamp = frame.timestamp,
            payload = frame.payload.kind(),
            "DataFrame received"
        );
        Ok(())
    }

    #[instrument(name = "log_writer_shutdown", skip(self))]
    async fn shutdown(&self) -> Result<(), ContractError> {
        info!(backend = %self.name, "LogWriter closed");
        Ok(())
    }
}
