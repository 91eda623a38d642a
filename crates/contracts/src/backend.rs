//! WriterBackend trait - Dispatcher output interface
//!
//! Defines the abstract interface for storage backends.

use crate::{ContractError, DataFrame};

/// Storage backend trait
///
/// One instance is shared by every concurrently running write task, so
/// methods take `&self`, implementations must also be `Sync` and handle
/// their own locking.
#[trait_variant::make(WriterBackend: Send)]
pub trait LocalWriterBackend {
    /// Backend name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist one frame
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write_frame(&self, frame: &DataFrame) -> Result<(), ContractError>;

    /// Release backend resources
    ///
    /// Called exactly once, after every admitted frame has been drained.
    async fn shutdown(&self) -> Result<(), ContractError>;
}
