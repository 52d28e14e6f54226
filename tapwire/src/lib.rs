//! # tapwire - Resource Interception Chain for Embedded Web Views
//!
//! `tapwire` decides, for every resource request issued by an embedded web
//! view, whether a registered handler serves it instead of the default network
//! stack. Requests first pass a **rewrite** phase that runs to a fixed point,
//! then a **load** phase where the first willing handler streams the response
//! through an ordered [`ResponseSink`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tapwire::prelude::*;
//! use tapwire::handlers::{EmptyResponse, SchemeRewrite};
//!
//! let registry = RegistryBuilder::new()
//!     .register(SchemeRewrite::new("foo", "file"))
//!     .register(EmptyResponse::new("gap-exec"))
//!     .build();
//! let dispatcher = Dispatcher::new(registry);
//!
//! let request = dispatcher.rewrite(Request::parse("foo://bar/index.html")?)?;
//! assert_eq!(request.url().as_str(), "file://bar/index.html");
//!
//! match dispatcher.load(request, callbacks).await? {
//!     LoadOutcome::Handled(id) => println!("served by {id}"),
//!     LoadOutcome::NotHandled(request) => network.fetch(request).await,
//! }
//! ```
//!
//! ## Features
//!
//! | Feature     | Default | Enables |
//! |-------------|---------|---------|
//! | `tracing`   | yes     | decision logging and [`layers::Traced`] |
//! | `timeout`   | yes     | [`layers::TimeoutLoader`] |
//! | `fs`        | yes     | [`handlers::FileLoader`] |
//! | `inventory` | yes     | [`register_handler!`] and `RegistryBuilder::register_collected` |
//! | `tower`     | no      | `handlers::ServiceLoader` |
//!
//! A workspace `cargo test` builds `tapwire-std` with `tower` and `inventory`
//! on. Use `cargo test --all-features` to build every optional facade path.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use tapwire_core::{
    // Errors
    BoxError,
    // Value types
    Bytes,
    // Handler
    Capabilities,
    DispatchError,
    DynResourceHandler,
    // Delivery
    FnCallbacks,
    HandlerId,
    HeaderMap,
    LoadError,
    LoadOutcome,
    LoadUnsupported,
    Method,
    Request,
    ResourceHandler,
    ResponseCallbacks,
    ResponseEvent,
    ResponseMeta,
    ResponseSink,
    RewriteError,
    SinkError,
    StatusCode,
    TapwireError,
    Url,
};

pub use tapwire_std::{
    CollectedResponse, Dispatcher, DispatcherBuilder, HandlerEntry, Registry, RegistryBuilder,
    ResponseStream, RewriteLimit, RewriteStep, RewriteTrace, StreamError,
};

/// Standard handler implementations.
pub mod handlers {
    #![allow(clippy::wildcard_imports)]
    pub use tapwire_std::handlers::*;
}

/// Handler wrappers.
pub mod layers {
    #![allow(clippy::wildcard_imports)]
    pub use tapwire_std::layers::*;
}

/// Channel-backed response delivery.
pub mod stream {
    pub use tapwire_std::stream::{
        ChannelCallbacks, CollectedResponse, ResponseStream, StreamError, channel,
    };
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use tapwire_std::testing::*;
}

/// Process-wide handler registration.
#[cfg(feature = "inventory")]
pub mod collected {
    pub use tapwire_std::collected::HandlerRegistration;
}

/// Prelude module - common imports for tapwire.
///
/// # Usage
///
/// ```rust,ignore
/// use tapwire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Dispatcher, LoadOutcome, Registry, RegistryBuilder, Request, ResourceHandler,
        ResponseCallbacks, ResponseMeta, ResponseSink, RewriteLimit, TapwireError,
    };
}

#[cfg(feature = "inventory")]
pub use tapwire_std::register_handler;

#[cfg(feature = "inventory")]
pub use inventory;
