//! # Response Delivery
//!
//! A loading handler never talks to the caller's callbacks directly. It gets a
//! [`ResponseSink`], which forwards to the caller's [`ResponseCallbacks`] only
//! while the delivery order holds:
//!
//! 1. `respond` exactly once, before anything else
//! 2. `send_data` zero or more times, empty chunks are dropped
//! 3. `finish` exactly once, after the last chunk
//!
//! Calls that break the order return a [`SinkError`] and never reach the
//! callbacks. Delivery for one request is serialized, so a handler may clone
//! the sink and feed it from several tasks or threads.

use crate::{error::SinkError, response::ResponseMeta};
use bytes::Bytes;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The caller-side destination of a response.
///
/// Implementations forward to whatever consumes the response (a web-view
/// runtime, a channel, a test recorder). They are invoked while the sink's
/// delivery lock is held and must not call back into the same sink.
pub trait ResponseCallbacks: Send + Sync + 'static {
    /// Called once with the response descriptor.
    fn on_response(&self, meta: ResponseMeta);

    /// Called for each non-empty body chunk, in order.
    fn on_data(&self, chunk: Bytes);

    /// Called once after the last chunk.
    fn on_finish(&self);
}

impl<C: ResponseCallbacks + ?Sized> ResponseCallbacks for Arc<C> {
    fn on_response(&self, meta: ResponseMeta) {
        (**self).on_response(meta)
    }

    fn on_data(&self, chunk: Bytes) {
        (**self).on_data(chunk)
    }

    fn on_finish(&self) {
        (**self).on_finish()
    }
}

/// [`ResponseCallbacks`] built from three closures.
///
/// # Example
///
/// ```rust,ignore
/// let callbacks = FnCallbacks::new(
///     |meta| println!("status {}", meta.status()),
///     |chunk| println!("{} bytes", chunk.len()),
///     || println!("done"),
/// );
/// ```
pub struct FnCallbacks<R, D, F> {
    on_response: R,
    on_data: D,
    on_finish: F,
}

impl<R, D, F> FnCallbacks<R, D, F>
where
    R: Fn(ResponseMeta) + Send + Sync + 'static,
    D: Fn(Bytes) + Send + Sync + 'static,
    F: Fn() + Send + Sync + 'static,
{
    /// Create callbacks from the three closures.
    pub fn new(on_response: R, on_data: D, on_finish: F) -> Self {
        Self {
            on_response,
            on_data,
            on_finish,
        }
    }
}

impl<R, D, F> ResponseCallbacks for FnCallbacks<R, D, F>
where
    R: Fn(ResponseMeta) + Send + Sync + 'static,
    D: Fn(Bytes) + Send + Sync + 'static,
    F: Fn() + Send + Sync + 'static,
{
    fn on_response(&self, meta: ResponseMeta) {
        (self.on_response)(meta)
    }

    fn on_data(&self, chunk: Bytes) {
        (self.on_data)(chunk)
    }

    fn on_finish(&self) {
        (self.on_finish)()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Streaming,
    Finished,
    Aborted,
}

struct Delivery {
    phase: Phase,
    callbacks: Box<dyn ResponseCallbacks>,
}

struct SinkInner {
    delivery: Mutex<Delivery>,
}

/// Ordering-enforcing handle through which a loading handler delivers its
/// response.
///
/// Cloning is cheap; all clones share the same delivery state.
#[derive(Clone)]
pub struct ResponseSink {
    inner: Arc<SinkInner>,
}

impl ResponseSink {
    /// Create a sink forwarding to `callbacks`.
    pub fn new(callbacks: impl ResponseCallbacks) -> Self {
        Self {
            inner: Arc::new(SinkInner {
                delivery: Mutex::new(Delivery {
                    phase: Phase::Pending,
                    callbacks: Box::new(callbacks),
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Delivery> {
        // Phase transitions happen after the callback returns, so a panicking
        // callback leaves the state consistent.
        self.inner
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver the response descriptor.
    pub fn respond(&self, meta: ResponseMeta) -> Result<(), SinkError> {
        let mut delivery = self.lock();
        match delivery.phase {
            Phase::Pending => {
                delivery.callbacks.on_response(meta);
                delivery.phase = Phase::Streaming;
                Ok(())
            }
            Phase::Streaming => Err(SinkError::AlreadyResponded),
            Phase::Finished => Err(SinkError::Finished),
            Phase::Aborted => Err(SinkError::Aborted),
        }
    }

    /// Deliver a body chunk. Empty chunks are dropped.
    pub fn send_data(&self, chunk: impl Into<Bytes>) -> Result<(), SinkError> {
        let chunk = chunk.into();
        let delivery = self.lock();
        match delivery.phase {
            Phase::Streaming => {
                if !chunk.is_empty() {
                    delivery.callbacks.on_data(chunk);
                }
                Ok(())
            }
            Phase::Pending => Err(SinkError::NotResponded),
            Phase::Finished => Err(SinkError::Finished),
            Phase::Aborted => Err(SinkError::Aborted),
        }
    }

    /// Signal that no more data will arrive.
    pub fn finish(&self) -> Result<(), SinkError> {
        let mut delivery = self.lock();
        match delivery.phase {
            Phase::Streaming => {
                delivery.callbacks.on_finish();
                delivery.phase = Phase::Finished;
                Ok(())
            }
            Phase::Pending => Err(SinkError::NotResponded),
            Phase::Finished => Err(SinkError::Finished),
            Phase::Aborted => Err(SinkError::Aborted),
        }
    }

    /// Deliver a complete response in one go: descriptor, the body as a
    /// single chunk (if non-empty), then completion.
    pub fn complete(&self, meta: ResponseMeta, body: impl Into<Bytes>) -> Result<(), SinkError> {
        self.respond(meta)?;
        self.send_data(body)?;
        self.finish()
    }

    /// Stop forwarding anything further to the callbacks.
    ///
    /// The dispatcher aborts the sink when the loading handler fails. A
    /// finished sink stays finished.
    pub fn abort(&self) {
        let mut delivery = self.lock();
        if delivery.phase != Phase::Finished {
            delivery.phase = Phase::Aborted;
        }
    }

    /// Whether the response descriptor has been delivered.
    pub fn has_responded(&self) -> bool {
        matches!(self.lock().phase, Phase::Streaming | Phase::Finished)
    }

    /// Whether completion has been delivered.
    pub fn is_finished(&self) -> bool {
        self.lock().phase == Phase::Finished
    }

    /// Whether the sink was aborted.
    pub fn is_aborted(&self) -> bool {
        self.lock().phase == Phase::Aborted
    }
}

impl std::fmt::Debug for ResponseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSink")
            .field("phase", &self.lock().phase)
            .finish()
    }
}

#[cfg(feature = "tracing")]
impl Drop for SinkInner {
    fn drop(&mut self) {
        let delivery = self
            .delivery
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        match delivery.phase {
            Phase::Pending => {
                tracing::warn!("response sink dropped before respond; caller will never see a response")
            }
            Phase::Streaming => {
                tracing::warn!("response sink dropped before finish; caller will see a truncated response")
            }
            Phase::Finished | Phase::Aborted => {}
        }
    }
}
