//! bincode 帧突发解码器

use contracts::{BurstDecoder, ContractError, DataBurst};
use tracing::trace;

/// Decoder for bincode-encoded `DataBurst` blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeBurstDecoder;

impl BincodeBurstDecoder {
    /// Encode a burst into a block this decoder accepts
    pub fn encode(&self, burst: &DataBurst) -> Result<Vec<u8>, ContractError> {
        bincode::serialize(burst).map_err(|e| ContractError::decode(self.name(), e.to_string()))
    }
}

impl BurstDecoder for BincodeBurstDecoder {
    fn name(&self) -> &str {
        "bincode"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DataBurst, ContractError> {
        let burst: DataBurst = bincode::deserialize(bytes)
            .map_err(|e| ContractError::decode(self.name(), e.to_string()))?;
        trace!(frames = burst.len(), bytes = bytes.len(), "bincode block decoded");
        Ok(burst)
    }
}
