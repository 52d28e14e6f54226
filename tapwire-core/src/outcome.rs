//! Load phase outcome.

use crate::{handler::HandlerId, request::Request};

/// What the load phase did with a request.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The handler in this slot claimed the request and accepted the sink.
    Handled(HandlerId),
    /// No handler claimed the request. The caller should fall back to its
    /// default loading behavior for the returned request.
    NotHandled(Request),
}

impl LoadOutcome {
    /// Whether a handler claimed the request.
    pub fn is_handled(&self) -> bool {
        matches!(self, LoadOutcome::Handled(_))
    }

    /// The claiming handler, if any.
    pub fn handler(&self) -> Option<HandlerId> {
        match self {
            LoadOutcome::Handled(id) => Some(*id),
            LoadOutcome::NotHandled(_) => None,
        }
    }

    /// The unclaimed request, if nobody handled it.
    pub fn into_unhandled(self) -> Option<Request> {
        match self {
            LoadOutcome::Handled(_) => None,
            LoadOutcome::NotHandled(request) => Some(request),
        }
    }
}
