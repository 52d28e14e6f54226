use tapwire_core::{BoxError, Capabilities, Request, ResourceHandler, ResponseSink};
use tracing::Instrument;

/// A handler wrapper that reports every decision through `tracing`.
///
/// Predicates and rewrites emit `trace`/`debug` events; the load future runs
/// inside a `load` span carrying the handler name and URL.
pub struct Traced<H> {
    inner: H,
}

impl<H> Traced<H> {
    /// Wrap a handler.
    pub const fn new(inner: H) -> Self {
        Self { inner }
    }

    /// Get a reference to the inner handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: Clone> Clone for Traced<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: ResourceHandler> ResourceHandler for Traced<H> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn will_rewrite(&self, request: &Request) -> bool {
        let wants = self.inner.will_rewrite(request);
        tracing::trace!(handler = self.inner.name(), url = %request.url(), wants, "will_rewrite");
        wants
    }

    fn rewrite(&self, request: Request) -> Result<Request, BoxError> {
        let from = request.url().clone();
        let result = self.inner.rewrite(request);
        match &result {
            Ok(next) => {
                tracing::debug!(handler = self.inner.name(), %from, to = %next.url(), "rewrite")
            }
            Err(error) => {
                tracing::warn!(handler = self.inner.name(), %from, %error, "rewrite failed")
            }
        }
        result
    }

    fn will_load(&self, request: &Request) -> bool {
        let wants = self.inner.will_load(request);
        tracing::trace!(handler = self.inner.name(), url = %request.url(), wants, "will_load");
        wants
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        let span = tracing::debug_span!("load", handler = self.inner.name(), url = %request.url());
        async move {
            let result = self.inner.load(request, sink).await;
            if let Err(error) = &result {
                tracing::warn!(%error, "load failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}
