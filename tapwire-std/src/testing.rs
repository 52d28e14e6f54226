//! Testing utilities for tapwire.
//!
//! - [`RecordingCallbacks`]: records every event a sink delivers
//! - [`CountingLoader`]: a loader for one scheme that counts its loads

use bytes::{Bytes, BytesMut};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use tapwire_core::{
    BoxError, Capabilities, Request, ResourceHandler, ResponseCallbacks, ResponseEvent,
    ResponseMeta, ResponseSink,
};

// ============================================================================
// Recording Callbacks
// ============================================================================

/// Callbacks that record every event they receive.
///
/// Clones share the same log, so keep one clone for assertions and hand the
/// other to a sink.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingCallbacks::new();
/// dispatcher.load(request, recorder.clone()).await?;
///
/// assert_eq!(recorder.body(), "hello");
/// assert!(recorder.is_finished());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingCallbacks {
    events: Arc<Mutex<Vec<ResponseEvent>>>,
}

impl RecordingCallbacks {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ResponseEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a clone of the recorded events, in delivery order.
    pub fn events(&self) -> Vec<ResponseEvent> {
        self.lock().clone()
    }

    /// The delivered response metadata, if any.
    pub fn meta(&self) -> Option<ResponseMeta> {
        self.lock().iter().find_map(|event| match event {
            ResponseEvent::Response(meta) => Some(meta.clone()),
            _ => None,
        })
    }

    /// Every delivered data chunk.
    pub fn chunks(&self) -> Vec<Bytes> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ResponseEvent::Data(chunk) => Some(chunk.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of data callbacks.
    pub fn data_calls(&self) -> usize {
        self.lock()
            .iter()
            .filter(|event| matches!(event, ResponseEvent::Data(_)))
            .count()
    }

    /// All chunks concatenated.
    pub fn body(&self) -> Bytes {
        let mut body = BytesMut::new();
        for chunk in self.chunks() {
            body.extend_from_slice(&chunk);
        }
        body.freeze()
    }

    /// Whether the finish callback fired.
    pub fn is_finished(&self) -> bool {
        self.lock()
            .iter()
            .any(|event| matches!(event, ResponseEvent::Finished))
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl ResponseCallbacks for RecordingCallbacks {
    fn on_response(&self, meta: ResponseMeta) {
        self.lock().push(ResponseEvent::Response(meta));
    }

    fn on_data(&self, chunk: Bytes) {
        self.lock().push(ResponseEvent::Data(chunk));
    }

    fn on_finish(&self) {
        self.lock().push(ResponseEvent::Finished);
    }
}

// ============================================================================
// Counting Loader
// ============================================================================

/// A loader that claims one scheme, answers `200` with a fixed body, and
/// counts how often it was asked to load.
#[derive(Debug, Clone)]
pub struct CountingLoader {
    scheme: String,
    body: Bytes,
    count: Arc<AtomicUsize>,
}

impl CountingLoader {
    /// Create a loader for `scheme` that answers with `body`.
    pub fn new(scheme: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            scheme: scheme.into(),
            body: body.into(),
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of loads so far, across all clones.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ResourceHandler for CountingLoader {
    fn name(&self) -> &str {
        "counting-loader"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LOAD
    }

    fn will_load(&self, request: &Request) -> bool {
        request.scheme() == self.scheme
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        sink.complete(ResponseMeta::ok(request.url().clone()), self.body.clone())?;
        Ok(())
    }
}
