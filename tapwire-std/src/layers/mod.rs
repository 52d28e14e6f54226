//! Handler wrappers.
//!
//! Each wrapper is itself a [`ResourceHandler`] that delegates to an inner
//! handler, so wrappers compose and register like any other handler.
//!
//! [`ResourceHandler`]: tapwire_core::ResourceHandler

#[cfg(feature = "timeout")]
pub mod timeout;
#[cfg(feature = "tracing")]
pub mod traced;

#[cfg(feature = "timeout")]
pub use timeout::{HandlerTimeout, TimeoutLoader};
#[cfg(feature = "tracing")]
pub use traced::Traced;
