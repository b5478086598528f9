//! Execution controller for a single outgoing HTTP request.
//!
//! [`RequestController`] composes three independent policies around one
//! `reqwest` request: retry-on-failure with fixed or exponential backoff
//! and a pluggable outcome check, a per-attempt timeout, and a delayed
//! parallel race that fires a second identical attempt sequence and keeps
//! whichever result lands first.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use reqctl::RequestController;
//!
//! # async fn demo() -> Result<(), reqctl::Error> {
//! let request = reqwest::Client::new()
//!     .get("https://example.com/health")
//!     .build()?;
//!
//! let response = RequestController::new(request)
//!     .fixed_retry(Duration::from_millis(200), 3)
//!     .attempt_timeout(Duration::from_secs(2))
//!     .race_after(Duration::from_millis(500))
//!     .send()
//!     .await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod controller;
mod errors;
mod exec;
mod plan;
mod transport;

pub use controller::RequestController;
pub use errors::Error;
pub use plan::{ExecutionPlan, RetryCheck, RetryKind, RetryPolicy, default_check};
pub use transport::Transport;
