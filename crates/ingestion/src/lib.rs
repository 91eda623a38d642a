//! # Ingestion
//!
//! Input block ingestion module.
//!
//! Responsibilities:
//! - Open input sources (named files, or stdin when none are given)
//! - Read each source into one raw block
//! - Decode raw blocks into `DataBurst`s
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{decoder_for, open_sources};
//! use contracts::InputFormat;
//!
//! let decoder = decoder_for(InputFormat::Bincode);
//! for mut source in open_sources(&paths).await? {
//!     let block = source.read_block().await?;
//!     let burst = decoder.decode(&block)?;
//! }
//! ```

mod decoders;
mod error;
mod source;

// Re-exports
pub use contracts::{BurstDecoder, DataBurst};
pub use decoders::{BincodeBurstDecoder, JsonBurstDecoder, decoder_for};
pub use error::{IngestionError, Result};
pub use source::{InputSource, open_sources};
