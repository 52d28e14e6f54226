//! Request value type.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

/// A resource request issued by the web view.
///
/// Requests are immutable values. A rewrite consumes the current request and
/// produces a new one; builder methods such as [`Request::with_url`] keep the
/// remaining parts intact.
///
/// # Example
///
/// ```rust,ignore
/// let request = Request::parse("foo://assets/index.html")?;
/// let rewritten = request.with_url(Url::parse("file:///www/index.html")?);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
}

impl Request {
    /// Create a `GET` request for the given URL with no headers.
    pub fn new(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Parse a URL and create a `GET` request for it.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Url::parse(url).map(Self::new)
    }

    /// Replace the method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the URL, keeping method and headers.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    /// Add a header, replacing any previous values for the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL scheme, always lowercase.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Split the request into its parts.
    pub fn into_parts(self) -> (Method, Url, HeaderMap) {
        (self.method, self.url, self.headers)
    }
}

impl From<Url> for Request {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::ACCEPT;

    #[test]
    fn test_with_url_keeps_method_and_headers() {
        let request = Request::parse("foo://x/app.js")
            .unwrap()
            .with_method(Method::POST)
            .with_header(ACCEPT, HeaderValue::from_static("*/*"));

        let rewritten = request
            .clone()
            .with_url(Url::parse("file:///www/app.js").unwrap());

        assert_eq!(rewritten.method(), &Method::POST);
        assert_eq!(rewritten.headers().get(ACCEPT).unwrap(), "*/*");
        assert_eq!(rewritten.scheme(), "file");
        assert_ne!(rewritten, request);
    }

    #[test]
    fn test_scheme_is_lowercase() {
        let request = Request::parse("GAP-EXEC://ping").unwrap();
        assert_eq!(request.scheme(), "gap-exec");
    }
}
