mod race;
mod retry;

pub(crate) use race::RaceCoordinator;
pub(crate) use retry::RetryExecutor;

use std::fmt;
use std::time::Duration;

use tracing::{Level, event};

/// Which of the two racing attempt sequences an event belongs to.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Branch {
    Primary,
    Hedge,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Primary => write!(f, "primary"),
            Branch::Hedge => write!(f, "hedge"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ExecutionTrace {
    pub attempts: u32,
    pub success: bool,
    pub total_elapsed: Duration,
}

impl ExecutionTrace {
    pub fn log(&self) {
        event!(
            Level::INFO,
            attempts = self.attempts,
            success = self.success,
            total_elapsed_ms = self.total_elapsed.as_millis() as u64,
            "retry.outcome"
        );
    }
}
