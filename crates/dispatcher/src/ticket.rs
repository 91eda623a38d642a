//! DispatchTicket - per-frame dispatch state machine
//!
//! `Admitted → Writing → Succeeded | Failed → Drained`

use std::fmt;
use std::time::{Duration, Instant};

/// Dispatch state of one admitted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    /// Gate slot acquired
    Admitted,
    /// Write task started
    Writing,
    /// Backend reported success
    Succeeded,
    /// Backend reported failure (or the write timed out)
    Failed,
    /// Counted into the accumulator
    Drained,
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admitted => "admitted",
            Self::Writing => "writing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Drained => "drained",
        };
        f.write_str(name)
    }
}

/// Rejected state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ticket {seq}: invalid transition {from} -> {to}")]
pub struct InvalidTransition {
    pub seq: u64,
    pub from: TicketState,
    pub to: TicketState,
}

/// Record of one admitted write, from admission until drained
#[derive(Debug, Clone)]
pub struct DispatchTicket {
    seq: u64,
    state: TicketState,
    write_started: Option<Instant>,
    write_time: Option<Duration>,
    /// Whether the outcome was `Succeeded` (kept once drained)
    succeeded: Option<bool>,
}

impl DispatchTicket {
    /// New ticket in the `Admitted` state
    pub fn admitted(seq: u64) -> Self {
        Self {
            seq,
            state: TicketState::Admitted,
            write_started: None,
            write_time: None,
            succeeded: None,
        }
    }

    /// Admission sequence number (0-based)
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Current state
    pub fn state(&self) -> TicketState {
        self.state
    }

    /// Outcome, once known
    pub fn succeeded(&self) -> Option<bool> {
        self.succeeded
    }

    /// Time spent in the backend, once the write finished
    pub fn write_time(&self) -> Option<Duration> {
        self.write_time
    }

    /// `Admitted → Writing`
    pub fn start_writing(&mut self) -> Result<(), InvalidTransition> {
        self.transition(TicketState::Admitted, TicketState::Writing)?;
        self.write_started = Some(Instant::now());
        Ok(())
    }

    /// `Writing → Succeeded | Failed`
    pub fn complete(&mut self, success: bool) -> Result<(), InvalidTransition> {
        let to = if success {
            TicketState::Succeeded
        } else {
            TicketState::Failed
        };
        self.transition(TicketState::Writing, to)?;
        self.write_time = self.write_started.map(|started| started.elapsed());
        self.succeeded = Some(success);
        Ok(())
    }

    /// `Succeeded | Failed → Drained`
    pub fn drain(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            TicketState::Succeeded | TicketState::Failed => {
                self.state = TicketState::Drained;
                Ok(())
            }
            from => Err(self.invalid(from, TicketState::Drained)),
        }
    }

    fn transition(&mut self, from: TicketState, to: TicketState) -> Result<(), InvalidTransition> {
        if self.state != from {
            return Err(self.invalid(self.state, to));
        }
        self.state = to;
        Ok(())
    }

    fn invalid(&self, from: TicketState, to: TicketState) -> InvalidTransition {
        InvalidTransition {
            seq: self.seq,
            from,
            to,
        }
    }
}
