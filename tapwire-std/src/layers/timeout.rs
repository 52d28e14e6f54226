//! Time-limited loading.

use std::time::Duration;
use tapwire_core::{BoxError, Capabilities, Request, ResourceHandler, ResponseSink};
use thiserror::Error;
use tokio::time::timeout;

/// Error returned when a wrapped handler's load does not resolve in time.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("handler load timed out after {0:?}")]
pub struct HandlerTimeout(pub Duration);

/// A handler wrapper that bounds how long the inner `load` future may run.
///
/// Only the future is bounded. A handler that moved its sink to a separate
/// task keeps delivering from there.
pub struct TimeoutLoader<H> {
    inner: H,
    duration: Duration,
}

impl<H> TimeoutLoader<H> {
    /// Wrap a handler.
    pub fn new(inner: H, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// The configured limit.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<H: ResourceHandler> ResourceHandler for TimeoutLoader<H> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn will_rewrite(&self, request: &Request) -> bool {
        self.inner.will_rewrite(request)
    }

    fn rewrite(&self, request: Request) -> Result<Request, BoxError> {
        self.inner.rewrite(request)
    }

    fn will_load(&self, request: &Request) -> bool {
        self.inner.will_load(request)
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        match timeout(self.duration, self.inner.load(request, sink)).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(HandlerTimeout(self.duration))),
        }
    }
}
