#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use reqctl::{Error, Transport};
use reqwest::{Request, Response};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A request template for tests that never reach a real socket.
pub fn dummy_request() -> Request {
    Request::new(
        reqwest::Method::GET,
        "http://localhost/unreachable".parse().unwrap(),
    )
}

pub fn response(status: u16) -> Response {
    Response::from(http::Response::builder().status(status).body("").unwrap())
}

/// What the scripted transport does for one call.
#[derive(Clone, Copy, Debug)]
pub enum Step {
    /// Wait, then deliver a response with this status.
    Respond(Duration, u16),
    /// Wait, then fail the attempt with a deadline error.
    Fail(Duration),
}

/// In-process transport that plays back a script by call order; calls past
/// the end repeat the last step. Used with the paused clock for
/// deterministic race and cancellation timelines.
pub struct ScriptedTransport {
    calls: AtomicUsize,
    script: Vec<Step>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        assert!(!script.is_empty(), "script must have at least one step");
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script,
        })
    }

    /// Number of sends issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _request: Request) -> Result<Response, Error> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script[idx.min(self.script.len() - 1)];
        match step {
            Step::Respond(latency, status) => {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Ok(response(status))
            }
            Step::Fail(latency) => {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Err(Error::DeadlineExceeded(latency))
            }
        }
    }
}
