//! Error types for tapwire.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`TapwireError`] - Top-level error type for all tapwire operations
//! - [`DispatchError`] - Errors while running a request through the chain
//! - [`RewriteError`] - Errors from the rewrite phase
//! - [`LoadError`] - Errors from the load phase
//! - [`SinkError`] - Response delivery out of order

use crate::handler::HandlerId;
use thiserror::Error;
use url::Url;

/// A boxed error type for handler-supplied failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all tapwire operations.
#[derive(Error, Debug)]
pub enum TapwireError {
    /// An error occurred while dispatching a request.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A response was delivered out of order.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors that can occur while running a request through both phases.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The rewrite phase failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// The load phase failed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors that can occur during the rewrite phase.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// The chain kept rewriting past the configured step limit.
    #[error("rewrite chain exceeded {limit} steps (handler {handler} still wants to rewrite {url})")]
    LimitExceeded {
        /// The configured limit.
        limit: usize,
        /// The handler that asked for one step too many.
        handler: HandlerId,
        /// The URL of the request at the point the limit was hit.
        url: Url,
    },

    /// A handler claimed a request and then failed to rewrite it.
    #[error("handler {handler} ({name}) failed to rewrite request")]
    Handler {
        /// Registration slot of the failing handler.
        handler: HandlerId,
        /// Diagnostic name of the failing handler.
        name: String,
        /// The handler's error.
        source: BoxError,
    },
}

/// Errors that can occur during the load phase.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The loading handler returned an error.
    #[error("handler {handler} ({name}) failed to load request")]
    Handler {
        /// Registration slot of the failing handler.
        handler: HandlerId,
        /// Diagnostic name of the failing handler.
        name: String,
        /// The handler's error.
        source: BoxError,
    },
}

/// Errors reported by a [`ResponseSink`] when delivery breaks the
/// response-then-data-then-finish order.
///
/// [`ResponseSink`]: crate::ResponseSink
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The response descriptor was already delivered.
    #[error("response already delivered")]
    AlreadyResponded,

    /// Data or completion was sent before the response descriptor.
    #[error("no response delivered yet")]
    NotResponded,

    /// The response has already completed.
    #[error("response already finished")]
    Finished,

    /// The load was abandoned after a handler failure.
    #[error("response was aborted")]
    Aborted,
}

/// Returned by the default [`ResourceHandler::load`] of handlers that never
/// claim requests.
///
/// [`ResourceHandler::load`]: crate::ResourceHandler::load
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("handler does not load requests")]
pub struct LoadUnsupported;

// Convenience conversions
impl From<BoxError> for TapwireError {
    fn from(err: BoxError) -> Self {
        TapwireError::Custom(err)
    }
}

impl From<RewriteError> for TapwireError {
    fn from(err: RewriteError) -> Self {
        TapwireError::Dispatch(DispatchError::Rewrite(err))
    }
}

impl From<LoadError> for TapwireError {
    fn from(err: LoadError) -> Self {
        TapwireError::Dispatch(DispatchError::Load(err))
    }
}
