//! Empty responses for bridge URLs.

use tapwire_core::{
    BoxError, Capabilities, Request, ResourceHandler, ResponseMeta, ResponseSink, StatusCode,
};

/// Claims every request of one scheme and answers it with an empty body.
///
/// Hybrid shells use URLs such as `gap-exec://` purely as a signal to native
/// code. The web view still expects a response, so this handler produces one
/// without any data chunks.
#[derive(Debug, Clone)]
pub struct EmptyResponse {
    scheme: String,
    status: StatusCode,
    mime_type: String,
}

impl EmptyResponse {
    /// Answer every request with scheme `scheme` with an empty `200 OK`.
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            status: StatusCode::OK,
            mime_type: mime::TEXT_PLAIN.to_string(),
        }
    }

    /// Use a different status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Use a different MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

impl ResourceHandler for EmptyResponse {
    fn name(&self) -> &str {
        "empty-response"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LOAD
    }

    fn will_load(&self, request: &Request) -> bool {
        request.scheme() == self.scheme
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        let meta = ResponseMeta::new(request.url().clone(), self.status)
            .with_mime_type(self.mime_type.as_str())
            .with_content_length(0);
        sink.respond(meta)?;
        sink.finish()?;
        Ok(())
    }
}
