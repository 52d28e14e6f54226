//! Channel-backed response delivery.
//!
//! [`channel`] pairs a [`ResponseCallbacks`] implementation with a
//! [`ResponseStream`], so a caller can consume a response as a `futures`
//! stream instead of supplying callbacks.

use bytes::{Bytes, BytesMut};
use futures::{
    Stream, StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded},
};
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tapwire_core::{ResponseCallbacks, ResponseEvent, ResponseMeta};
use thiserror::Error;

/// Errors produced while collecting a [`ResponseStream`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The stream ended before completion was signalled.
    #[error("response stream ended before completion")]
    Truncated,

    /// An event arrived in a position the response order does not allow.
    #[error("unexpected {0} event")]
    OutOfOrder(&'static str),
}

/// [`ResponseCallbacks`] that forward every event into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelCallbacks {
    tx: UnboundedSender<ResponseEvent>,
}

impl ChannelCallbacks {
    fn send(&self, event: ResponseEvent) {
        // A dropped receiver means nobody wants the rest of the response.
        let _ = self.tx.unbounded_send(event);
    }
}

impl ResponseCallbacks for ChannelCallbacks {
    fn on_response(&self, meta: ResponseMeta) {
        self.send(ResponseEvent::Response(meta));
    }

    fn on_data(&self, chunk: Bytes) {
        self.send(ResponseEvent::Data(chunk));
    }

    fn on_finish(&self) {
        self.send(ResponseEvent::Finished);
        self.tx.close_channel();
    }
}

/// Create a connected callbacks/stream pair.
pub fn channel() -> (ChannelCallbacks, ResponseStream) {
    let (tx, rx) = unbounded();
    (ChannelCallbacks { tx }, ResponseStream { rx })
}

/// A response consumed as a stream of [`ResponseEvent`]s.
///
/// The stream ends after [`ResponseEvent::Finished`], or early if the loading
/// handler failed or dropped its sink.
#[derive(Debug)]
pub struct ResponseStream {
    rx: UnboundedReceiver<ResponseEvent>,
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedResponse {
    /// The response descriptor.
    pub meta: ResponseMeta,
    /// All body chunks concatenated.
    pub body: Bytes,
    /// How many data chunks made up the body.
    pub chunks: usize,
}

impl ResponseStream {
    /// Buffer the whole response, checking the delivery order on the way.
    pub async fn collect_body(mut self) -> Result<CollectedResponse, StreamError> {
        let meta = match self.next().await {
            Some(ResponseEvent::Response(meta)) => meta,
            Some(ResponseEvent::Data(_)) => return Err(StreamError::OutOfOrder("data")),
            Some(ResponseEvent::Finished) => return Err(StreamError::OutOfOrder("finish")),
            None => return Err(StreamError::Truncated),
        };

        let mut body = BytesMut::new();
        let mut chunks = 0;
        loop {
            match self.next().await {
                Some(ResponseEvent::Data(chunk)) => {
                    body.extend_from_slice(&chunk);
                    chunks += 1;
                }
                Some(ResponseEvent::Finished) => break,
                Some(ResponseEvent::Response(_)) => {
                    return Err(StreamError::OutOfOrder("response"));
                }
                None => return Err(StreamError::Truncated),
            }
        }

        Ok(CollectedResponse {
            meta,
            body: body.freeze(),
            chunks,
        })
    }
}

impl Stream for ResponseStream {
    type Item = ResponseEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapwire_core::{ResponseSink, Url};

    fn meta() -> ResponseMeta {
        ResponseMeta::ok(Url::parse("foo://x").unwrap())
    }

    #[tokio::test]
    async fn test_collect_body() {
        let (callbacks, stream) = channel();
        let sink = ResponseSink::new(callbacks);
        sink.respond(meta()).unwrap();
        sink.send_data("hello ").unwrap();
        sink.send_data("world").unwrap();
        sink.finish().unwrap();

        let collected = stream.collect_body().await.unwrap();
        assert_eq!(collected.body, "hello world");
        assert_eq!(collected.chunks, 2);
        assert_eq!(collected.meta, meta());
    }

    #[tokio::test]
    async fn test_dropped_sink_truncates() {
        let (callbacks, stream) = channel();
        let sink = ResponseSink::new(callbacks);
        sink.respond(meta()).unwrap();
        drop(sink);

        assert_eq!(stream.collect_body().await, Err(StreamError::Truncated));
    }

    #[tokio::test]
    async fn test_out_of_order_channel_is_detected() {
        let (callbacks, stream) = channel();
        callbacks.on_data(Bytes::from_static(b"x"));
        drop(callbacks);

        assert_eq!(
            stream.collect_body().await,
            Err(StreamError::OutOfOrder("data"))
        );
    }
}
