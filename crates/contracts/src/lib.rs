//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Model
//! - `DataFrame` is opaque to the dispatch engine, only backends inspect it
//! - `DataBurst` is the ordered output of decoding one input block

mod backend;
mod config;
mod decoder;
mod error;
mod frame;

pub use backend::{LocalWriterBackend, WriterBackend};
pub use config::*;
pub use decoder::BurstDecoder;
pub use error::*;
pub use frame::*;
