//! Rewrite-phase handlers.

use tapwire_core::{BoxError, Capabilities, Request, ResourceHandler};
use url::{Position, Url};

/// Rewrites every request of one scheme to another scheme, keeping the rest
/// of the URL.
///
/// `SchemeRewrite::new("foo", "file")` turns `foo://x/a.js` into
/// `file://x/a.js`.
#[derive(Debug, Clone)]
pub struct SchemeRewrite {
    from: String,
    to: String,
}

impl SchemeRewrite {
    /// Create a rewrite from scheme `from` to scheme `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into().to_ascii_lowercase(),
            to: to.into().to_ascii_lowercase(),
        }
    }
}

impl ResourceHandler for SchemeRewrite {
    fn name(&self) -> &str {
        "scheme-rewrite"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REWRITE
    }

    fn will_rewrite(&self, request: &Request) -> bool {
        request.scheme() == self.from
    }

    fn rewrite(&self, request: Request) -> Result<Request, BoxError> {
        // `Url::set_scheme` refuses to cross between special and non-special
        // schemes, so rebuild the URL from its serialization instead.
        let url = Url::parse(&format!(
            "{}{}",
            self.to,
            &request.url()[Position::AfterScheme..]
        ))?;
        Ok(request.with_url(url))
    }
}

/// A rewrite handler built from a predicate and a rewrite closure.
///
/// # Example
///
/// ```rust,ignore
/// let strip_query = FnRewrite::new(
///     |r: &Request| r.url().query().is_some(),
///     |r: Request| {
///         let mut url = r.url().clone();
///         url.set_query(None);
///         Ok(r.with_url(url))
///     },
/// );
/// ```
pub struct FnRewrite<P, F> {
    predicate: P,
    rewrite: F,
}

impl<P, F> FnRewrite<P, F>
where
    P: Fn(&Request) -> bool + Send + Sync + 'static,
    F: Fn(Request) -> Result<Request, BoxError> + Send + Sync + 'static,
{
    /// Create a rewrite handler.
    pub fn new(predicate: P, rewrite: F) -> Self {
        Self { predicate, rewrite }
    }
}

impl<P, F> ResourceHandler for FnRewrite<P, F>
where
    P: Fn(&Request) -> bool + Send + Sync + 'static,
    F: Fn(Request) -> Result<Request, BoxError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "fn-rewrite"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::REWRITE
    }

    fn will_rewrite(&self, request: &Request) -> bool {
        (self.predicate)(request)
    }

    fn rewrite(&self, request: Request) -> Result<Request, BoxError> {
        (self.rewrite)(request)
    }
}
