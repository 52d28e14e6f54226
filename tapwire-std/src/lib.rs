//! # tapwire-std
//!
//! Standard implementations for the tapwire interception chain.
//!
//! This crate provides:
//! - **Registration**: [`RegistryBuilder`], [`Registry`]
//! - **Dispatch**: [`Dispatcher`] running the rewrite and load phases
//! - **Channel delivery**: [`ResponseStream`], a `futures` stream of response events
//! - **Standard handlers**: scheme rewriting, empty responses, static content,
//!   local files (`fs`), tower services (`tower`)
//! - **Handler wrappers**: tracing (`tracing`), load timeouts (`timeout`)
//! - **Collected handlers**: process-wide registration (`inventory`)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use tapwire_core;

// Modules
#[cfg(feature = "inventory")]
pub mod collected;
pub mod dispatcher;
pub mod handlers;
pub mod layers;
pub mod registry;
pub mod stream;
pub mod testing;

pub use dispatcher::{Dispatcher, DispatcherBuilder, RewriteLimit, RewriteStep, RewriteTrace};
pub use registry::{HandlerEntry, Registry, RegistryBuilder};
pub use stream::{CollectedResponse, ResponseStream, StreamError};

#[cfg(feature = "inventory")]
pub use inventory;
