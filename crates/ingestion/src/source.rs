//! Input sources
//!
//! Each source yields exactly one raw block: the whole file, or the whole of
//! stdin when no files are named.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use metrics::counter;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};

const STDIN_NAME: &str = "<stdin>";

/// Where a raw block comes from
#[derive(Debug)]
enum SourceKind {
    /// Opened file (taken on read)
    File { path: PathBuf, file: Option<File> },
    /// Process standard input
    Stdin { consumed: bool },
}

/// One input source
#[derive(Debug)]
pub struct InputSource {
    name: String,
    kind: SourceKind,
}

impl InputSource {
    /// Open a named file
    ///
    /// # Errors
    /// Returns `IngestionError::OpenFailed` if the file cannot be opened
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        let file = File::open(&path)
            .await
            .map_err(|source| IngestionError::OpenFailed {
                source_name: name.clone(),
                source,
            })?;

        Ok(Self {
            name,
            kind: SourceKind::File {
                path,
                file: Some(file),
            },
        })
    }

    /// Standard input source
    pub fn stdin() -> Self {
        Self {
            name: STDIN_NAME.to_string(),
            kind: SourceKind::Stdin { consumed: false },
        }
    }

    /// Source name (used for logging)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File path, `None` for stdin
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            SourceKind::File { path, .. } => Some(path),
            SourceKind::Stdin { .. } => None,
        }
    }

    /// Read the whole source into one block
    ///
    /// A source can only be read once.
    ///
    /// # Errors
    /// Returns `IngestionError::ReadFailed` on IO failure and
    /// `IngestionError::AlreadyConsumed` on a second call
    #[instrument(name = "input_source_read", skip(self), fields(source = %self.name))]
    pub async fn read_block(&mut self) -> Result<Bytes> {
        let bytes = match &mut self.kind {
            SourceKind::File { file, .. } => {
                let file = file.take().ok_or_else(|| IngestionError::AlreadyConsumed {
                    source_name: self.name.clone(),
                })?;
                read_all(&self.name, file).await?
            }
            SourceKind::Stdin { consumed } => {
                if *consumed {
                    return Err(IngestionError::AlreadyConsumed {
                        source_name: self.name.clone(),
                    });
                }
                *consumed = true;
                read_all(&self.name, tokio::io::stdin()).await?
            }
        };

        counter!("frame_collector_bytes_read_total").increment(bytes.len() as u64);
        debug!(source = %self.name, bytes = bytes.len(), "Read input block");
        Ok(bytes)
    }
}

async fn read_all<R: AsyncRead + Unpin>(name: &str, mut reader: R) -> Result<Bytes> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|source| IngestionError::ReadFailed {
            source_name: name.to_string(),
            source,
        })?;
    Ok(Bytes::from(buf))
}

/// Open every named file up front, or fall back to stdin
///
/// # Errors
/// Fails on the first file that cannot be opened; nothing has been read yet
/// at that point.
pub async fn open_sources(paths: &[PathBuf]) -> Result<Vec<InputSource>> {
    if paths.is_empty() {
        return Ok(vec![InputSource::stdin()]);
    }

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(InputSource::open(path).await?);
    }
    Ok(sources)
}
