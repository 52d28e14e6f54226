//! # Resource Handlers
//!
//! The pluggable unit of the interception chain. A handler can take part in
//! either phase or both:
//!
//! - **Rewrite**: [`ResourceHandler::will_rewrite`] decides,
//!   [`ResourceHandler::rewrite`] produces the replacement request
//! - **Load**: [`ResourceHandler::will_load`] decides,
//!   [`ResourceHandler::load`] streams the response into a [`ResponseSink`]
//!
//! Every method has a default, so a handler only implements the phase it
//! cares about. Decisions must be stateless with respect to the chain: the
//! dispatcher may call the predicates any number of times per request.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`ResourceHandler`] uses native `async fn` for zero-cost static dispatch.
//! Registries store handlers as [`DynResourceHandler`] trait objects, which
//! every `ResourceHandler` implements through a blanket impl.

use crate::{
    error::{BoxError, LoadUnsupported},
    request::Request,
    sink::ResponseSink,
};
use std::{fmt, future::Future, pin::Pin, sync::Arc};

bitflags::bitflags! {
    /// The phases a handler takes part in.
    ///
    /// The dispatcher never consults a handler's predicate for a phase that
    /// is missing from its capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The handler may rewrite requests.
        const REWRITE = 1 << 0;
        /// The handler may load requests.
        const LOAD = 1 << 1;
    }
}

/// Position of a handler in its registry.
///
/// Registration order is priority order: a lower id wins ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(usize);

impl HandlerId {
    /// Create an id for the given registration index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The registration index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A pluggable component able to rewrite and/or load resource requests.
///
/// # Example
///
/// ```rust,ignore
/// struct GapExec;
///
/// impl ResourceHandler for GapExec {
///     fn will_load(&self, request: &Request) -> bool {
///         request.scheme() == "gap-exec"
///     }
///
///     async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
///         sink.respond(ResponseMeta::ok(request.url().clone()))?;
///         sink.finish()?;
///         Ok(())
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `ResourceHandler`",
    label = "missing `ResourceHandler` implementation",
    note = "Implement `will_rewrite`/`rewrite` and/or `will_load`/`load` for `{Self}`."
)]
pub trait ResourceHandler: Send + Sync + 'static {
    /// A name used in logs and errors. Defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The phases this handler takes part in.
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    /// Whether this handler wants to rewrite `request`.
    fn will_rewrite(&self, request: &Request) -> bool {
        let _ = request;
        false
    }

    /// Produce the replacement for a request this handler claimed in
    /// [`will_rewrite`](Self::will_rewrite).
    ///
    /// Returning a request equal to the input counts as no rewrite.
    fn rewrite(&self, request: Request) -> Result<Request, BoxError> {
        Ok(request)
    }

    /// Whether this handler wants to load `request`.
    fn will_load(&self, request: &Request) -> bool {
        let _ = request;
        false
    }

    /// Load a request this handler claimed in [`will_load`](Self::will_load).
    ///
    /// The handler must call [`ResponseSink::respond`] once, then
    /// [`ResponseSink::send_data`] for each chunk, then
    /// [`ResponseSink::finish`]. The sink may be cloned and moved to another
    /// task; the returned future only needs to resolve once the handler has
    /// taken responsibility for the response.
    fn load(
        &self,
        request: Request,
        sink: ResponseSink,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async move {
            drop((request, sink));
            Err(Box::new(LoadUnsupported) as BoxError)
        }
    }
}

/// Dynamic object-safe version of [`ResourceHandler`].
///
/// Use this trait when you need runtime polymorphism (e.g., in a Registry).
pub trait DynResourceHandler: Send + Sync + 'static {
    /// See [`ResourceHandler::name`].
    fn name_dyn(&self) -> &str;

    /// See [`ResourceHandler::capabilities`].
    fn capabilities_dyn(&self) -> Capabilities;

    /// See [`ResourceHandler::will_rewrite`].
    fn will_rewrite_dyn(&self, request: &Request) -> bool;

    /// See [`ResourceHandler::rewrite`].
    fn rewrite_dyn(&self, request: Request) -> Result<Request, BoxError>;

    /// See [`ResourceHandler::will_load`].
    fn will_load_dyn(&self, request: &Request) -> bool;

    /// See [`ResourceHandler::load`] (dynamic dispatch version).
    fn load_dyn<'a>(
        &'a self,
        request: Request,
        sink: ResponseSink,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

// Blanket implementation: any ResourceHandler is usable as a trait object.
impl<T: ResourceHandler> DynResourceHandler for T {
    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn capabilities_dyn(&self) -> Capabilities {
        self.capabilities()
    }

    fn will_rewrite_dyn(&self, request: &Request) -> bool {
        self.will_rewrite(request)
    }

    fn rewrite_dyn(&self, request: Request) -> Result<Request, BoxError> {
        self.rewrite(request)
    }

    fn will_load_dyn(&self, request: &Request) -> bool {
        self.will_load(request)
    }

    fn load_dyn<'a>(
        &'a self,
        request: Request,
        sink: ResponseSink,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(self.load(request, sink))
    }
}

// Allow boxed and shared trait objects where a ResourceHandler is expected.
// Calls go through `**self` so they reach the erased handler, not the blanket impl.
macro_rules! forward_erased {
    ($($ptr:ident),*) => {$(
        impl ResourceHandler for $ptr<dyn DynResourceHandler> {
            fn name(&self) -> &str {
                (**self).name_dyn()
            }

            fn capabilities(&self) -> Capabilities {
                (**self).capabilities_dyn()
            }

            fn will_rewrite(&self, request: &Request) -> bool {
                (**self).will_rewrite_dyn(request)
            }

            fn rewrite(&self, request: Request) -> Result<Request, BoxError> {
                (**self).rewrite_dyn(request)
            }

            fn will_load(&self, request: &Request) -> bool {
                (**self).will_load_dyn(request)
            }

            async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
                (**self).load_dyn(request, sink).await
            }
        }
    )*};
}

forward_erased!(Box, Arc);
