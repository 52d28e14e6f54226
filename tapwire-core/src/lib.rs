//! # tapwire-core
//!
//! Core traits and value types for the tapwire interception chain.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! handler plugins that don't need the registry or dispatcher from
//! `tapwire-std`.
//!
//! # Two-Stage Architecture
//!
//! Every resource request issued by the web view passes through two stages.
//!
//! ## Stage 1: Rewrite
//!
//! Registered handlers may replace the incoming [`Request`] with a new one.
//! The chain is re-scanned from the first handler after every rewrite, until
//! no handler wants to rewrite the current request (a fixed point).
//!
//! - **Chaining**: several handlers may each rewrite in turn
//! - **Priority**: the earliest-registered willing handler acts first
//!
//! ## Stage 2: Load
//!
//! The first handler that claims the final request produces its response
//! through a [`ResponseSink`]: one [`ResponseMeta`], zero or more data chunks,
//! then completion. Nobody else sees the request.
//!
//! - **Exclusive**: at most one handler loads a given request
//! - **Ordered**: the sink rejects out-of-order delivery instead of trusting
//!   the handler
//!
//! # Error Types
//!
//! - [`TapwireError`] - Top-level error type
//! - [`DispatchError`] - Errors raised while dispatching a request
//! - [`SinkError`] - Out-of-order response delivery

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod handler;
mod outcome;
mod request;
mod response;
mod sink;

// Re-exports
pub use error::{
    BoxError, DispatchError, LoadError, LoadUnsupported, RewriteError, SinkError, TapwireError,
};
pub use handler::{Capabilities, DynResourceHandler, HandlerId, ResourceHandler};
pub use outcome::LoadOutcome;
pub use request::Request;
pub use response::{ResponseEvent, ResponseMeta};
pub use sink::{FnCallbacks, ResponseCallbacks, ResponseSink};

// Value types that appear in the public API.
pub use bytes::Bytes;
pub use http::{HeaderMap, Method, StatusCode};
pub use url::Url;
