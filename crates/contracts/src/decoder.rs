//! BurstDecoder trait - raw block to frames
//!
//! Decouples the wire format from the collector that drives the engine.

use crate::{ContractError, DataBurst};

/// Decoder turning one raw input block into a burst of frames
///
/// Implementations must be pure: no I/O, no shared state. An error means the
/// whole block yields zero usable frames.
///
/// # Example
///
/// ```ignore
/// let decoder = BincodeBurstDecoder;
/// match decoder.decode(&bytes) {
///     Ok(burst) => println!("{} frames", burst.len()),
///     Err(e) => eprintln!("skipping block: {e}"),
/// }
/// ```
pub trait BurstDecoder: Send + Sync {
    /// Decoder name (used for logging)
    fn name(&self) -> &str;

    /// Decode one block
    ///
    /// # Errors
    /// Returns `ContractError::Decode` if the block is malformed
    fn decode(&self, bytes: &[u8]) -> Result<DataBurst, ContractError>;
}
