//! Standard handler implementations.
//!
//! | Handler | Phase | Use Case |
//! |---------|-------|----------|
//! | [`SchemeRewrite`] | rewrite | Point a custom scheme at another one (`foo://` to `file://`) |
//! | [`FnRewrite`] | rewrite | Closure-based rewriting |
//! | [`EmptyResponse`] | load | Answer bridge URLs with an empty response |
//! | [`StaticContent`] | load | Serve in-memory bodies |
//! | `FileLoader` | load | Serve local files (feature `fs`) |
//! | `ServiceLoader` | load | Delegate to a tower `Service` (feature `tower`) |

pub mod empty;
#[cfg(feature = "fs")]
pub mod fs;
pub mod rewrite;
#[cfg(feature = "tower")]
pub mod service;
pub mod static_content;

pub use empty::EmptyResponse;
#[cfg(feature = "fs")]
pub use fs::FileLoader;
pub use rewrite::{FnRewrite, SchemeRewrite};
#[cfg(feature = "tower")]
pub use service::ServiceLoader;
pub use static_content::StaticContent;
