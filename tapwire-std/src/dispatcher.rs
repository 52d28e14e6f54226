//! # Dispatcher
//!
//! Runs a request through both phases of the chain.
//!
//! ## Rewrite phase
//!
//! Scan the registry in order. The first handler whose `will_rewrite` accepts
//! the *current* request rewrites it, and the scan restarts from the first
//! handler with the new request. The phase ends when a full pass finds no
//! handler that changes the request. A handler that claims a request but hands
//! back an equal value is treated as declining, so the scan moves on to the
//! next handler instead of spinning.
//!
//! The number of rewrite steps is bounded by [`RewriteLimit`]. Handlers that
//! rewrite each other's output back and forth would otherwise loop forever.
//!
//! ## Load phase
//!
//! Scan the registry once. The first handler whose `will_load` accepts the
//! request gets it together with a [`ResponseSink`] wired to the caller's
//! callbacks. Nobody else sees the request. If no handler claims it, the
//! request is handed back as [`LoadOutcome::NotHandled`].

use crate::{
    registry::{HandlerEntry, Registry},
    stream::{self, ResponseStream},
};
use std::sync::Arc;
use tapwire_core::{
    DispatchError, HandlerId, LoadError, LoadOutcome, Request, ResponseCallbacks, ResponseSink,
    RewriteError, Url,
};

/// Upper bound on the number of rewrites applied to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteLimit {
    /// Fail with [`RewriteError::LimitExceeded`] once this many rewrites have
    /// been applied and another handler still wants to rewrite.
    Bounded(usize),
    /// Keep rewriting until a fixed point, however long that takes.
    Unbounded,
}

impl RewriteLimit {
    /// The default bound.
    pub const DEFAULT_STEPS: usize = 32;
}

impl Default for RewriteLimit {
    fn default() -> Self {
        RewriteLimit::Bounded(Self::DEFAULT_STEPS)
    }
}

/// One applied rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteStep {
    /// The handler that rewrote the request.
    pub handler: HandlerId,
    /// The URL it produced.
    pub url: Url,
}

/// The result of a traced rewrite phase.
#[derive(Debug, Clone)]
pub struct RewriteTrace {
    /// The fixed-point request.
    pub request: Request,
    /// Every applied rewrite, in order.
    pub steps: Vec<RewriteStep>,
}

impl RewriteTrace {
    /// Whether any handler rewrote the request.
    pub fn was_rewritten(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// Builder for a [`Dispatcher`].
///
/// # Example
/// ```ignore
/// let dispatcher = DispatcherBuilder::new(registry)
///     .rewrite_limit(RewriteLimit::Bounded(8))
///     .build();
/// ```
pub struct DispatcherBuilder {
    registry: Arc<Registry>,
    rewrite_limit: RewriteLimit,
}

impl DispatcherBuilder {
    /// Start from a registry.
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self {
            registry: registry.into(),
            rewrite_limit: RewriteLimit::default(),
        }
    }

    /// Set the rewrite step bound.
    pub fn rewrite_limit(mut self, limit: RewriteLimit) -> Self {
        self.rewrite_limit = limit;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            registry: self.registry,
            rewrite_limit: self.rewrite_limit,
        }
    }
}

/// Runs the rewrite and load phases against a shared [`Registry`].
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    rewrite_limit: RewriteLimit,
}

impl Dispatcher {
    /// Create a dispatcher with the default rewrite limit.
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        DispatcherBuilder::new(registry).build()
    }

    /// Start configuring a dispatcher.
    pub fn builder(registry: impl Into<Arc<Registry>>) -> DispatcherBuilder {
        DispatcherBuilder::new(registry)
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The configured rewrite bound.
    pub fn rewrite_limit(&self) -> RewriteLimit {
        self.rewrite_limit
    }

    /// Run the rewrite phase and return the fixed-point request.
    pub fn rewrite(&self, request: Request) -> Result<Request, RewriteError> {
        self.rewrite_traced(request).map(|trace| trace.request)
    }

    /// Run the rewrite phase and return the fixed-point request together with
    /// every step taken.
    pub fn rewrite_traced(&self, request: Request) -> Result<RewriteTrace, RewriteError> {
        let mut current = request;
        let mut steps: Vec<RewriteStep> = Vec::new();

        'scan: loop {
            for entry in self.registry.rewriters() {
                let handler = entry.handler();
                if !handler.will_rewrite_dyn(&current) {
                    continue;
                }

                let previous = current.clone();
                let next = handler
                    .rewrite_dyn(current)
                    .map_err(|source| RewriteError::Handler {
                        handler: entry.id(),
                        name: entry.name().to_string(),
                        source,
                    })?;

                if next == previous {
                    current = next;
                    continue;
                }

                if let RewriteLimit::Bounded(limit) = self.rewrite_limit {
                    if steps.len() >= limit {
                        return Err(RewriteError::LimitExceeded {
                            limit,
                            handler: entry.id(),
                            url: previous.url().clone(),
                        });
                    }
                }

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    handler = %entry.id(),
                    name = entry.name(),
                    from = %previous.url(),
                    to = %next.url(),
                    "request rewritten"
                );

                steps.push(RewriteStep {
                    handler: entry.id(),
                    url: next.url().clone(),
                });
                current = next;
                continue 'scan;
            }

            return Ok(RewriteTrace {
                request: current,
                steps,
            });
        }
    }

    fn claimant(&self, request: &Request) -> Option<&HandlerEntry> {
        self.registry
            .loaders()
            .find(|entry| entry.handler().will_load_dyn(request))
    }

    /// Whether any handler would load `request` once it is rewritten.
    pub fn will_handle(&self, request: Request) -> Result<bool, RewriteError> {
        let request = self.rewrite(request)?;
        Ok(self.claimant(&request).is_some())
    }

    /// Run the load phase for an already rewritten request.
    ///
    /// Returns once the claiming handler's `load` future resolves. Handlers
    /// that keep streaming from another task may still be delivering to
    /// `callbacks` after that.
    pub async fn load<C>(&self, request: Request, callbacks: C) -> Result<LoadOutcome, LoadError>
    where
        C: ResponseCallbacks,
    {
        let Some(entry) = self.claimant(&request) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(url = %request.url(), "no handler claimed request");
            return Ok(LoadOutcome::NotHandled(request));
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            handler = %entry.id(),
            name = entry.name(),
            url = %request.url(),
            "loading request"
        );

        let sink = ResponseSink::new(callbacks);
        match entry.handler().load_dyn(request, sink.clone()).await {
            Ok(()) => Ok(LoadOutcome::Handled(entry.id())),
            Err(source) => {
                sink.abort();

                #[cfg(feature = "tracing")]
                tracing::warn!(
                    handler = %entry.id(),
                    name = entry.name(),
                    error = %source,
                    "handler failed to load request"
                );

                Err(LoadError::Handler {
                    handler: entry.id(),
                    name: entry.name().to_string(),
                    source,
                })
            }
        }
    }

    /// Rewrite then load.
    pub async fn dispatch<C>(
        &self,
        request: Request,
        callbacks: C,
    ) -> Result<LoadOutcome, DispatchError>
    where
        C: ResponseCallbacks,
    {
        let request = self.rewrite(request)?;
        Ok(self.load(request, callbacks).await?)
    }

    /// Rewrite then load into a channel.
    ///
    /// Returns `None` when no handler claims the rewritten request.
    pub async fn open(&self, request: Request) -> Result<Option<ResponseStream>, DispatchError> {
        let (callbacks, response) = stream::channel();
        match self.dispatch(request, callbacks).await? {
            LoadOutcome::Handled(_) => Ok(Some(response)),
            LoadOutcome::NotHandled(_) => Ok(None),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.registry.len())
            .field("rewrite_limit", &self.rewrite_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        handlers::{EmptyResponse, FnRewrite, SchemeRewrite},
        registry::RegistryBuilder,
        testing::{CountingLoader, RecordingCallbacks},
    };
    use tapwire_core::{ResourceHandler, ResponseEvent};

    fn request(url: &str) -> Request {
        Request::parse(url).unwrap()
    }

    #[test]
    fn test_rewrite_without_interest_is_identity() {
        let dispatcher = Dispatcher::new(
            RegistryBuilder::new()
                .register(SchemeRewrite::new("foo", "file"))
                .build(),
        );

        let input = request("https://example.com/app.js");
        let trace = dispatcher.rewrite_traced(input.clone()).unwrap();
        assert_eq!(trace.request, input);
        assert!(!trace.was_rewritten());
    }

    #[test]
    fn test_rewrite_chains_across_handlers() {
        let registry = RegistryBuilder::new()
            .register(SchemeRewrite::new("app", "foo"))
            .register(SchemeRewrite::new("foo", "file"))
            .build();
        let dispatcher = Dispatcher::new(registry);

        let trace = dispatcher.rewrite_traced(request("app://x/index.html")).unwrap();
        assert_eq!(trace.request.url().as_str(), "file://x/index.html");
        let by: Vec<_> = trace.steps.iter().map(|s| s.handler.index()).collect();
        assert_eq!(by, vec![0, 1]);
    }

    #[test]
    fn test_rewrite_restarts_from_first_handler() {
        // The second handler's output is only claimable by the first.
        let registry = RegistryBuilder::new()
            .register(SchemeRewrite::new("mid", "end"))
            .register(SchemeRewrite::new("start", "mid"))
            .build();
        let dispatcher = Dispatcher::new(registry);

        let trace = dispatcher.rewrite_traced(request("start://a")).unwrap();
        assert_eq!(trace.request.scheme(), "end");
        let by: Vec<_> = trace.steps.iter().map(|s| s.handler.index()).collect();
        assert_eq!(by, vec![1, 0]);
    }

    #[test]
    fn test_identity_rewrite_does_not_block_later_handlers() {
        let registry = RegistryBuilder::new()
            .register(FnRewrite::new(|_: &Request| true, Ok))
            .register(SchemeRewrite::new("foo", "file"))
            .build();
        let dispatcher = Dispatcher::new(registry);

        let output = dispatcher.rewrite(request("foo://x")).unwrap();
        assert_eq!(output.scheme(), "file");
    }

    #[test]
    fn test_rewrite_cycle_hits_limit() {
        let registry = RegistryBuilder::new()
            .register(SchemeRewrite::new("a", "b"))
            .register(SchemeRewrite::new("b", "a"))
            .build();
        let dispatcher = Dispatcher::builder(registry)
            .rewrite_limit(RewriteLimit::Bounded(5))
            .build();

        let err = dispatcher.rewrite(request("a://loop")).unwrap_err();
        match err {
            RewriteError::LimitExceeded { limit, handler, .. } => {
                assert_eq!(limit, 5);
                // Five steps alternate 0,1,0,1,0; the sixth belongs to #1.
                assert_eq!(handler.index(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rewrite_handler_failure_is_reported() {
        let registry = RegistryBuilder::new()
            .register(FnRewrite::new(
                |r: &Request| r.scheme() == "bad",
                |_| Err("no mapping".into()),
            ))
            .build();
        let dispatcher = Dispatcher::new(registry);

        let err = dispatcher.rewrite(request("bad://x")).unwrap_err();
        assert!(matches!(err, RewriteError::Handler { handler, .. } if handler.index() == 0));
    }

    #[tokio::test]
    async fn test_load_first_claimant_wins() {
        let first = CountingLoader::new("gap-exec", "first");
        let second = CountingLoader::new("gap-exec", "second");
        let registry = RegistryBuilder::new()
            .register(first.clone())
            .register(second.clone())
            .build();
        let dispatcher = Dispatcher::new(registry);

        let recorder = RecordingCallbacks::new();
        let outcome = dispatcher
            .load(request("gap-exec://1"), recorder.clone())
            .await
            .unwrap();

        assert_eq!(outcome.handler(), Some(HandlerId::new(0)));
        assert_eq!(first.count(), 1);
        assert_eq!(second.count(), 0);
        assert_eq!(recorder.body(), "first");
    }

    #[tokio::test]
    async fn test_load_unclaimed_returns_request() {
        let dispatcher = Dispatcher::new(
            RegistryBuilder::new()
                .register(EmptyResponse::new("gap-exec"))
                .build(),
        );

        let recorder = RecordingCallbacks::new();
        let outcome = dispatcher
            .load(request("https://example.com/"), recorder.clone())
            .await
            .unwrap();

        let unhandled = outcome.into_unhandled().unwrap();
        assert_eq!(unhandled.url().as_str(), "https://example.com/");
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_aborts_sink() {
        struct Broken;

        impl ResourceHandler for Broken {
            fn will_load(&self, _request: &Request) -> bool {
                true
            }

            async fn load(
                &self,
                request: Request,
                sink: ResponseSink,
            ) -> Result<(), tapwire_core::BoxError> {
                sink.respond(tapwire_core::ResponseMeta::ok(request.url().clone()))?;
                Err("disk on fire".into())
            }
        }

        let dispatcher = Dispatcher::new(RegistryBuilder::new().register(Broken).build());
        let recorder = RecordingCallbacks::new();
        let err = dispatcher
            .load(request("file:///x"), recorder.clone())
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::Handler { handler, .. } if handler.index() == 0));
        assert_eq!(recorder.events().len(), 1);
        assert!(matches!(recorder.events()[0], ResponseEvent::Response(_)));
    }

    #[tokio::test]
    async fn test_will_handle_sees_rewritten_request() {
        let registry = RegistryBuilder::new()
            .register(SchemeRewrite::new("foo", "gap-exec"))
            .register(EmptyResponse::new("gap-exec"))
            .build();
        let dispatcher = Dispatcher::new(registry);

        assert!(dispatcher.will_handle(request("foo://x")).unwrap());
        assert!(!dispatcher.will_handle(request("https://x")).unwrap());
    }
}
