use std::sync::Arc;

use reqwest::{Request, Response};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::errors::Error;
use crate::plan::{ExecutionPlan, RetryKind};
use crate::transport::Transport;

use super::ExecutionTrace;

/// Runs one logical request attempt and repeats it under the plan's retry
/// policy. Attempts are strictly sequential; this type owns no concurrency
/// of its own.
pub(crate) struct RetryExecutor {
    plan: ExecutionPlan,
    transport: Arc<dyn Transport>,
}

impl RetryExecutor {
    pub(crate) fn new(plan: ExecutionPlan, transport: Arc<dyn Transport>) -> Self {
        Self { plan, transport }
    }

    /// Executes until the check predicate reports success or the retry
    /// budget is spent. The final attempt's outcome is returned as-is,
    /// success or not.
    pub(crate) async fn run(
        &self,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<Response, Error> {
        let retry = &self.plan.retry;
        let start = Instant::now();
        let mut attempts: u32 = 1;

        let mut outcome = self.attempt(request, cancel).await;
        if retry.kind == RetryKind::None || !retry.should_retry(outcome.as_ref()) {
            Self::trace(attempts, &outcome, start);
            return outcome;
        }

        for i in 0..retry.max_retries {
            let delay = retry.delay_for_retry(i);
            warn!(
                attempt = attempts,
                max_retries = retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                outcome = %describe(&outcome),
                "retry.scheduling"
            );
            if !delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        // Scope is gone; hand back the last outcome without
                        // issuing further attempts.
                        Self::trace(attempts, &outcome, start);
                        return outcome;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            outcome = self.attempt(request, cancel).await;
            attempts += 1;
            if !retry.should_retry(outcome.as_ref()) {
                break;
            }
        }

        Self::trace(attempts, &outcome, start);
        outcome
    }

    /// One send, bounded by the per-attempt deadline when configured. The
    /// deadline is local to the attempt and narrower than the inbound
    /// scope; it never extends it.
    async fn attempt(
        &self,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<Response, Error> {
        let req = request.try_clone().ok_or(Error::RequestNotReusable)?;
        let send = self.transport.send(req);
        match self.plan.attempt_timeout {
            Some(limit) => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                    timed = tokio::time::timeout(limit, send) => match timed {
                        Ok(outcome) => outcome,
                        Err(_) => Err(Error::DeadlineExceeded(limit)),
                    },
                }
            }
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                    outcome = send => outcome,
                }
            }
        }
    }

    fn trace(attempts: u32, outcome: &Result<Response, Error>, start: Instant) {
        ExecutionTrace {
            attempts,
            success: outcome.is_ok(),
            total_elapsed: start.elapsed(),
        }
        .log();
    }
}

fn describe(outcome: &Result<Response, Error>) -> String {
    match outcome {
        Ok(resp) => format!("status {}", resp.status()),
        Err(err) => err.to_string(),
    }
}
