use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request, Response};
use tokio_util::sync::CancellationToken;

use crate::errors::Error;
use crate::exec::{RaceCoordinator, RetryExecutor};
use crate::plan::{ExecutionPlan, RetryCheck, RetryKind, RetryPolicy, default_check};
use crate::transport::{Transport, shared_client};

/// Fluent controller for executing one logical HTTP request under retry,
/// per-attempt timeout, and delayed-race policies.
///
/// Each configuration call consumes the controller and returns the updated
/// value. The resulting plan is immutable once execution starts; racing
/// branches run against private clones of it.
pub struct RequestController {
    request: Request,
    cancel: CancellationToken,
    plan: ExecutionPlan,
}

impl RequestController {
    /// Controller with no retry, no timeout, and no race configured.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            cancel: CancellationToken::new(),
            plan: ExecutionPlan::new(),
        }
    }

    /// Ties execution to an external cancellation scope. Per-attempt
    /// timeouts are layered inside this scope and never extend it.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Retry with a constant interval between attempts, classifying
    /// outcomes with the default check (retry on transport errors only).
    pub fn fixed_retry(self, interval: Duration, max_retries: u32) -> Self {
        self.retry_policy(
            RetryKind::Fixed,
            interval,
            max_retries,
            Arc::new(default_check),
        )
    }

    pub fn fixed_retry_with_check(
        self,
        interval: Duration,
        max_retries: u32,
        check: RetryCheck,
    ) -> Self {
        self.retry_policy(RetryKind::Fixed, interval, max_retries, check)
    }

    /// Retry waiting `interval * 2^i` before the i-th retry. Growth is
    /// unbounded, so pick the base interval accordingly.
    pub fn exponential_retry(self, interval: Duration, max_retries: u32) -> Self {
        self.retry_policy(
            RetryKind::Exponential,
            interval,
            max_retries,
            Arc::new(default_check),
        )
    }

    pub fn exponential_retry_with_check(
        self,
        interval: Duration,
        max_retries: u32,
        check: RetryCheck,
    ) -> Self {
        self.retry_policy(RetryKind::Exponential, interval, max_retries, check)
    }

    // Last configuration wins: a later retry call replaces the whole policy.
    fn retry_policy(
        mut self,
        kind: RetryKind,
        interval: Duration,
        max_retries: u32,
        check: RetryCheck,
    ) -> Self {
        self.plan.retry = RetryPolicy::new(kind, interval, max_retries, check);
        self
    }

    /// Deadline applied to every individual attempt.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.plan.attempt_timeout = Some(timeout);
        self
    }

    /// Starts a second identical attempt sequence `delay` after the first
    /// and returns whichever finishes first.
    pub fn race_after(mut self, delay: Duration) -> Self {
        self.plan.race_delay = Some(delay);
        self
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Executes against the process-shared default client.
    pub async fn send(self) -> Result<Response, Error> {
        let transport: Arc<dyn Transport> = Arc::new(shared_client().clone());
        self.dispatch(transport).await
    }

    /// Executes against an explicit transport.
    pub async fn send_with(self, transport: impl Transport + 'static) -> Result<Response, Error> {
        self.dispatch(Arc::new(transport)).await
    }

    // The only branching point between the two execution strategies; both
    // share identical attempt, timeout, and retry handling.
    async fn dispatch(self, transport: Arc<dyn Transport>) -> Result<Response, Error> {
        let Self {
            request,
            cancel,
            plan,
        } = self;
        if plan.race_delay.is_some() {
            RaceCoordinator::new(plan, transport)
                .run(request, &cancel)
                .await
        } else {
            RetryExecutor::new(plan, transport)
                .run(&request, &cancel)
                .await
        }
    }
}
