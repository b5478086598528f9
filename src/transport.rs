use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use crate::errors::Error;

/// The external collaborator that performs the actual network send.
///
/// `reqwest::Client` is the production implementation; tests substitute
/// scripted transports. A transport is shared across racing branches
/// without any controller-side locking, so implementations must be safe to
/// call concurrently.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, Error>;
}

#[async_trait]
impl Transport for Client {
    async fn send(&self, request: Request) -> Result<Response, Error> {
        Ok(self.execute(request).await?)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response, Error> {
        (**self).send(request).await
    }
}

/// Process-wide default client, built on first use and shared by every
/// controller that does not supply its own transport.
pub(crate) fn shared_client() -> &'static Client {
    static SHARED: OnceLock<Client> = OnceLock::new();
    SHARED.get_or_init(Client::new)
}
