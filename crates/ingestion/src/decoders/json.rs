//! JSON 帧突发解码器

use contracts::{BurstDecoder, ContractError, DataBurst, DataFrame};
use serde::Deserialize;
use tracing::trace;

/// Accepted JSON shapes: `{"frames": [...]}` or a bare `[...]`
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonBlock {
    Burst(DataBurst),
    Frames(Vec<DataFrame>),
}

/// Decoder for JSON-encoded `DataBurst` blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBurstDecoder;

impl JsonBurstDecoder {
    /// Encode a burst into a block this decoder accepts
    pub fn encode(&self, burst: &DataBurst) -> Result<Vec<u8>, ContractError> {
        serde_json::to_vec(burst).map_err(|e| ContractError::decode(self.name(), e.to_string()))
    }
}

impl BurstDecoder for JsonBurstDecoder {
    fn name(&self) -> &str {
        "json"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DataBurst, ContractError> {
        // Whitespace-only block carries no frames
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(DataBurst::default());
        }

        let block: JsonBlock = serde_json::from_slice(bytes)
            .map_err(|e| ContractError::decode(self.name(), e.to_string()))?;
        let burst = match block {
            JsonBlock::Burst(burst) => burst,
            JsonBlock::Frames(frames) => DataBurst::new(frames),
        };
        trace!(frames = burst.len(), bytes = bytes.len(), "json block decoded");
        Ok(burst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::FramePayload;

    #[test]
    fn test_decode_object_form() {
        let block = br#"{"frames": [
            {"source": {"host": "web01"}, "timestamp": 5, "payload": {"number": 3}},
            {"timestamp": 6}
        ]}"#;
        let burst = JsonBurstDecoder.decode(block).unwrap();
        assert_eq!(burst.len(), 2);
        assert_eq!(burst.frames[0].payload, FramePayload::Number(3));
        assert_eq!(burst.frames[1].payload, FramePayload::Empty);
    }

    #[test]
    fn test_decode_array_form() {
        let block = br#"[{"timestamp": 1, "payload": {"text": "up"}}]"#;
        let burst = JsonBurstDecoder.decode(block).unwrap();
        assert_eq!(burst.frames[0].payload, FramePayload::Text("up".into()));
    }

    #[test]
    fn test_whitespace_block_is_empty_burst() {
        assert!(JsonBurstDecoder.decode(b" \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_block() {
        let err = JsonBurstDecoder.decode(b"{\"frames\": [").unwrap_err();
        assert!(matches!(err, ContractError::Decode { .. }));
    }
}
