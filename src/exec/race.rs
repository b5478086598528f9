use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request, Response};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::Error;
use crate::plan::ExecutionPlan;
use crate::transport::Transport;

use super::{Branch, RetryExecutor};

/// Runs two retry executors concurrently over the same logical request: one
/// immediately, one after the configured delay. The first branch to finish
/// supplies the result and cancels the shared scope so the loser stops
/// retrying instead of consuming the transport after a winner is known.
pub(crate) struct RaceCoordinator {
    plan: ExecutionPlan,
    transport: Arc<dyn Transport>,
}

impl RaceCoordinator {
    pub(crate) fn new(plan: ExecutionPlan, transport: Arc<dyn Transport>) -> Self {
        Self { plan, transport }
    }

    pub(crate) async fn run(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<Response, Error> {
        let delay = self.plan.race_delay.unwrap_or_default();
        let start = Instant::now();
        let scope = cancel.child_token();
        // Capacity 1 makes try_send the write-once gate: the first branch
        // to finish lands its outcome, a later send is a no-op.
        let (tx, mut rx) = mpsc::channel(1);

        let hedge_request = request.try_clone().ok_or(Error::RequestNotReusable)?;
        self.spawn_branch(
            Branch::Primary,
            request,
            Duration::ZERO,
            scope.clone(),
            tx.clone(),
        );
        self.spawn_branch(Branch::Hedge, hedge_request, delay, scope, tx);

        match rx.recv().await {
            Some((branch, outcome)) => {
                info!(
                    winner = %branch,
                    success = outcome.is_ok(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "race.settled"
                );
                outcome
            }
            // Both branches bailed out before sending: the inbound scope
            // was already cancelled when the race started.
            None => Err(Error::Cancelled),
        }
    }

    fn spawn_branch(
        &self,
        branch: Branch,
        request: Request,
        wait: Duration,
        scope: CancellationToken,
        tx: mpsc::Sender<(Branch, Result<Response, Error>)>,
    ) {
        let executor = RetryExecutor::new(self.plan.clone(), Arc::clone(&self.transport));
        tokio::spawn(async move {
            if !wait.is_zero() {
                tokio::select! {
                    _ = scope.cancelled() => {
                        debug!(branch = %branch, "race.branch_skipped");
                        return;
                    }
                    _ = tokio::time::sleep(wait) => {}
                }
            }
            if scope.is_cancelled() {
                debug!(branch = %branch, "race.branch_skipped");
                return;
            }
            let outcome = executor.run(&request, &scope).await;
            if tx.try_send((branch, outcome)).is_ok() {
                scope.cancel();
            }
        });
    }
}
