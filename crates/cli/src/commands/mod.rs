//! Command implementations.

mod run;
mod validate;

pub use run::run_collector;
pub use validate::run_validate;
