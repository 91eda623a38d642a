//! Burst decoder implementations

mod bincode;
mod json;

pub use self::bincode::BincodeBurstDecoder;
pub use self::json::JsonBurstDecoder;

use std::sync::Arc;

use contracts::{BurstDecoder, InputFormat};

/// Build the decoder for a configured input format
pub fn decoder_for(format: InputFormat) -> Arc<dyn BurstDecoder> {
    match format {
        InputFormat::Bincode => Arc::new(BincodeBurstDecoder),
        InputFormat::Json => Arc::new(JsonBurstDecoder),
    }
}
