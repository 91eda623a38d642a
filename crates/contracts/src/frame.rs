//! DataFrame / DataBurst - Decoder output
//!
//! 帧与帧突发的数据结构。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single unit of data to be persisted.
///
/// The dispatch engine never looks inside a frame; only backends do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    /// Source tags identifying the series this frame belongs to
    #[serde(default)]
    pub source: BTreeMap<String, String>,

    /// Nanoseconds since the Unix epoch
    pub timestamp: u64,

    /// Frame value
    #[serde(default)]
    pub payload: FramePayload,
}

impl DataFrame {
    /// Create a frame with no source tags
    pub fn new(timestamp: u64, payload: FramePayload) -> Self {
        Self {
            source: BTreeMap::new(),
            timestamp,
            payload,
        }
    }

    /// Add a source tag (builder style)
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.source.insert(key.into(), value.into());
        self
    }

    /// Render source tags as `k:v,k:v` (sorted by key)
    pub fn source_key(&self) -> String {
        self.source
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Frame value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePayload {
    /// No value, the frame only marks an event
    #[default]
    Empty,
    /// Unsigned integer
    Number(u64),
    /// Floating point
    Real(f64),
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Binary(#[serde(with = "serde_bytes")] Vec<u8>),
}

impl FramePayload {
    /// Short payload kind name (used for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Number(_) => "number",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }
}

/// Ordered sequence of frames decoded from one input block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBurst {
    /// Frames in decode order
    #[serde(default)]
    pub frames: Vec<DataFrame>,
}

impl DataBurst {
    /// Create a burst from frames
    pub fn new(frames: Vec<DataFrame>) -> Self {
        Self { frames }
    }

    /// Number of frames in the burst
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the burst carries no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl IntoIterator for DataBurst {
    type Item = DataFrame;
    type IntoIter = std::vec::IntoIter<DataFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}
