//! Response descriptor and stream events.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use url::Url;

/// Describes a response before any of its body is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    url: Url,
    status: StatusCode,
    mime_type: Option<String>,
    text_encoding: Option<String>,
    content_length: Option<u64>,
    headers: HeaderMap,
}

impl ResponseMeta {
    /// Create a descriptor with the given status and nothing else.
    pub fn new(url: Url, status: StatusCode) -> Self {
        Self {
            url,
            status,
            mime_type: None,
            text_encoding: None,
            content_length: None,
            headers: HeaderMap::new(),
        }
    }

    /// Create a `200 OK` descriptor.
    pub fn ok(url: Url) -> Self {
        Self::new(url, StatusCode::OK)
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the text encoding name (e.g. `utf-8`).
    pub fn with_text_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.text_encoding = Some(encoding.into());
        self
    }

    /// Set the expected body length in bytes.
    pub fn with_content_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }

    /// Add a header, replacing any previous values for the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The URL the response belongs to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The MIME type, if known.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// The text encoding name, if known.
    pub fn text_encoding(&self) -> Option<&str> {
        self.text_encoding.as_deref()
    }

    /// The expected body length, if known.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the status is in the `2xx` range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// One step of a response as delivered to the caller.
///
/// A well-formed response is exactly one `Response`, any number of `Data`,
/// then one `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEvent {
    /// The response descriptor.
    Response(ResponseMeta),
    /// A non-empty body chunk.
    Data(Bytes),
    /// No more data will arrive.
    Finished,
}
