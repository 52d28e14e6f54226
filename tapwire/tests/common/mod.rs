#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tapwire::{
    BoxError, Request, ResourceHandler, ResponseMeta, ResponseSink, SinkError,
};

pub fn request(url: &str) -> Request {
    Request::parse(url).unwrap()
}

// ============================================================================
// Test Handlers
// ============================================================================

/// Claims one scheme and delivers its chunks from a spawned task.
pub struct SpawningLoader {
    pub scheme: &'static str,
    pub chunks: Vec<&'static str>,
}

impl ResourceHandler for SpawningLoader {
    fn will_load(&self, request: &Request) -> bool {
        request.scheme() == self.scheme
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        let chunks = self.chunks.clone();
        tokio::spawn(async move {
            sink.respond(ResponseMeta::ok(request.url().clone()))?;
            for chunk in chunks {
                tokio::task::yield_now().await;
                sink.send_data(chunk)?;
            }
            sink.finish()
        });
        Ok(())
    }
}

/// Breaks every delivery rule once and records what the sink said.
pub struct MisbehavingLoader {
    pub rejected: Arc<Mutex<Vec<SinkError>>>,
}

impl ResourceHandler for MisbehavingLoader {
    fn will_load(&self, request: &Request) -> bool {
        request.scheme() == "rude"
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        let mut rejected = Vec::new();
        rejected.extend(sink.send_data("early").err());
        rejected.extend(sink.finish().err());
        sink.respond(ResponseMeta::ok(request.url().clone()))?;
        rejected.extend(sink.respond(ResponseMeta::ok(request.url().clone())).err());
        sink.send_data("body")?;
        sink.finish()?;
        rejected.extend(sink.send_data("late").err());
        rejected.extend(sink.finish().err());
        *self.rejected.lock().unwrap() = rejected;
        Ok(())
    }
}

/// Rewrites every request it sees and counts the calls.
pub struct CountingRewrite {
    pub calls: Arc<AtomicUsize>,
    pub from: &'static str,
    pub to: &'static str,
}

impl ResourceHandler for CountingRewrite {
    fn will_rewrite(&self, request: &Request) -> bool {
        request.scheme() == self.from
    }

    fn rewrite(&self, request: Request) -> Result<Request, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url().as_str().replacen(self.from, self.to, 1);
        Ok(request.with_url(url.parse()?))
    }
}
