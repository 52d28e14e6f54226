//! Tower integration.
//!
//! [`ServiceLoader`] lets any `tower::Service<Request>` that produces a
//! complete response act as a loading handler, so existing tower middleware
//! (retries, concurrency limits, buffering) can sit behind the chain.

use bytes::Bytes;
use tapwire_core::{
    BoxError, Capabilities, Request, ResourceHandler, ResponseMeta, ResponseSink,
};
use tower::{Service, ServiceExt};

/// Wraps a tower `Service` as a loading handler.
///
/// The service is cloned for every load and driven with `oneshot`, so it
/// must be `Clone`. Its response is delivered as a single chunk.
///
/// # Example
///
/// ```rust,ignore
/// let loader = ServiceLoader::new(
///     |r: &Request| r.scheme() == "api",
///     tower::service_fn(|r: Request| async move {
///         Ok::<_, BoxError>((ResponseMeta::ok(r.url().clone()), Bytes::from("{}")))
///     }),
/// );
/// ```
pub struct ServiceLoader<P, S> {
    predicate: P,
    service: S,
}

impl<P, S> ServiceLoader<P, S> {
    /// Create a loader that claims requests matching `predicate`.
    pub fn new(predicate: P, service: S) -> Self {
        Self { predicate, service }
    }

    /// Get a reference to the inner service.
    pub fn inner(&self) -> &S {
        &self.service
    }
}

impl<P, S> ResourceHandler for ServiceLoader<P, S>
where
    P: Fn(&Request) -> bool + Send + Sync + 'static,
    S: Service<Request, Response = (ResponseMeta, Bytes)> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    fn name(&self) -> &str {
        "service-loader"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LOAD
    }

    fn will_load(&self, request: &Request) -> bool {
        (self.predicate)(request)
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        let (meta, body) = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(Into::<BoxError>::into)?;
        sink.complete(meta, body)?;
        Ok(())
    }
}
