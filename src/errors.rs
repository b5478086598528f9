use std::time::Duration;

use thiserror::Error;

/// Failure modes surfaced by the controller.
///
/// Transport failures pass through verbatim; exhausting a retry budget is
/// not an error of its own, the last attempt's outcome is returned as-is.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A per-attempt deadline elapsed before the transport produced an outcome.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
    /// The execution scope was cancelled before an outcome was produced.
    #[error("execution cancelled")]
    Cancelled,
    /// The request body is a stream and cannot be replayed for another attempt.
    #[error("request body cannot be reused for another attempt")]
    RequestNotReusable,
}

impl Error {
    /// True when this outcome means a deadline expired, whether the
    /// controller's own per-attempt timer fired or the transport reported
    /// its deadline. Callers testing "did we time out" use this rather than
    /// matching variants.
    pub fn is_deadline_exceeded(&self) -> bool {
        match self {
            Error::DeadlineExceeded(_) => true,
            Error::Transport(err) => err.is_timeout(),
            _ => false,
        }
    }
}
