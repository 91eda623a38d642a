//! # Dispatcher
//!
//! 帧写入分发模块。
//!
//! 负责：
//! - 以固定并发上限 (`parallelism`) 调度写入
//! - 按 `batch_size` 分批排空结果，限制积压
//! - 每个被接纳的帧恰好计数一次

pub mod backends;
pub mod collector;
pub mod engine;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod ticket;

pub use backends::{AnyBackend, FileWriter, LogWriter, NetworkWriter, create_backend};
pub use collector::{Collector, CollectorReport};
pub use contracts::{DataFrame, WriterBackend};
pub use engine::{DispatchEngine, DrainRecord, EngineConfig};
pub use error::DispatcherError;
pub use gate::{AdmissionGate, GatePermit};
pub use metrics::{ResultAccumulator, RunSummary};
pub use ticket::{DispatchTicket, InvalidTransition, TicketState};
