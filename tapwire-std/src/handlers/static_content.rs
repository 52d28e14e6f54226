//! In-memory content.

use bytes::Bytes;
use std::collections::HashMap;
use tapwire_core::{
    BoxError, Capabilities, Request, ResourceHandler, ResponseMeta, ResponseSink, StatusCode,
};
use url::Url;

#[derive(Debug, Clone)]
struct Entry {
    body: Bytes,
    mime_type: Option<String>,
}

/// Serves fixed bodies for exact URLs.
///
/// Bodies are delivered in chunks of at most `chunk_size` bytes.
///
/// # Example
///
/// ```rust,ignore
/// let content = StaticContent::new()
///     .with_entry(Url::parse("app://shell/boot.js")?, "start()", Some("text/javascript"))
///     .with_chunk_size(4096);
/// ```
#[derive(Debug, Clone)]
pub struct StaticContent {
    entries: HashMap<Url, Entry>,
    chunk_size: usize,
}

impl StaticContent {
    /// The default chunk size.
    pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

    /// Create an empty content table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Add a body for `url`.
    pub fn with_entry(
        mut self,
        url: Url,
        body: impl Into<Bytes>,
        mime_type: Option<&str>,
    ) -> Self {
        self.entries.insert(
            url,
            Entry {
                body: body.into(),
                mime_type: mime_type.map(str::to_string),
            },
        );
        self
    }

    /// Set the maximum chunk size. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Number of URLs served.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no URL is served.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StaticContent {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandler for StaticContent {
    fn name(&self) -> &str {
        "static-content"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LOAD
    }

    fn will_load(&self, request: &Request) -> bool {
        self.entries.contains_key(request.url())
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        let Some(entry) = self.entries.get(request.url()) else {
            sink.complete(
                ResponseMeta::new(request.url().clone(), StatusCode::NOT_FOUND),
                Bytes::new(),
            )?;
            return Ok(());
        };

        let mut meta = ResponseMeta::ok(request.url().clone())
            .with_content_length(entry.body.len() as u64);
        if let Some(mime_type) = &entry.mime_type {
            meta = meta.with_mime_type(mime_type.as_str());
        }
        sink.respond(meta)?;

        let mut offset = 0;
        while offset < entry.body.len() {
            let end = (offset + self.chunk_size).min(entry.body.len());
            sink.send_data(entry.body.slice(offset..end))?;
            offset = end;
        }
        sink.finish()?;
        Ok(())
    }
}
