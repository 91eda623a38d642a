//! FileWriter - appends frames to a JSON-lines file

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use contracts::{ContractError, DataFrame, FileBackendConfig, WriterBackend};
use tracing::{debug, error, instrument};

/// Backend that appends each frame as one JSON line
pub struct FileWriter {
    name: String,
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileWriter {
    /// Open (or create) the output file in append mode
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Create from the `[file]` config section
    pub fn from_config(name: impl Into<String>, config: &FileBackendConfig) -> std::io::Result<Self> {
        Self::new(name, &config.data_frame_file)
    }

    /// Output file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, frame: &DataFrame) -> Result<(), ContractError> {
        let mut line = serde_json::to_vec(frame)
            .map_err(|e| ContractError::backend_write(&self.name, format!("json error: {e}")))?;
        line.push(b'\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ContractError::backend_write(&self.name, "writer lock poisoned"))?;
        writer.write_all(&line).map_err(|e| {
            error!(backend = %self.name, error = %e, "Append failed");
            ContractError::backend_write(&self.name, e.to_string())
        })
    }
}

impl WriterBackend for FileWriter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_writer_write",
        skip(self, frame),
        fields(backend = %self.name, timestamp = frame.timestamp)
    )]
    async fn write_frame(&self, frame: &DataFrame) -> Result<(), ContractError> {
        self.append_line(frame)
    }

    #[instrument(name = "file_writer_shutdown", skip(self))]
    async fn shutdown(&self) -> Result<(), ContractError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ContractError::backend_shutdown(&self.name, "writer lock poisoned"))?;
        writer
            .flush()
            .map_err(|e| ContractError::backend_shutdown(&self.name, e.to_string()))?;
        debug!(backend = %self.name, path = %self.path.display(), "FileWriter closed");
        Ok(())
    }
}
