//! Registry module for handler management.
//!
//! This module provides a builder for registering handlers and a frozen
//! registry for immutable, thread-safe dispatch. Registration order is kept
//! as-is and is the only priority the dispatcher knows about.

use std::sync::Arc;
use tapwire_core::{Capabilities, DynResourceHandler, HandlerId, ResourceHandler};

/// A registered handler with its slot and declared capabilities.
pub struct HandlerEntry {
    id: HandlerId,
    capabilities: Capabilities,
    handler: Arc<dyn DynResourceHandler>,
}

impl HandlerEntry {
    /// The registration slot.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// The handler's diagnostic name.
    pub fn name(&self) -> &str {
        self.handler().name_dyn()
    }

    /// The phases the handler declared at registration.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Get the handler reference.
    pub fn handler(&self) -> &dyn DynResourceHandler {
        &*self.handler
    }

    /// Get a shared handle to the handler.
    pub fn shared(&self) -> Arc<dyn DynResourceHandler> {
        Arc::clone(&self.handler)
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

// ============================================================================
// RegistryBuilder - for constructing registries
// ============================================================================

/// Builder for constructing a [`Registry`].
///
/// Handlers are appended in call order. Registering the same handler twice
/// gives it two slots; nothing is deduplicated.
///
/// # Example
/// ```ignore
/// let registry = RegistryBuilder::new()
///     .register(SchemeRewrite::new("foo", "file"))
///     .register(EmptyResponse::new("gap-exec"))
///     .build();
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: Vec<Arc<dyn DynResourceHandler>>,
}

impl RegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    pub fn register<H: ResourceHandler>(mut self, handler: H) -> Self {
        self.register_mut(handler);
        self
    }

    /// Append a handler (mutable version).
    pub fn register_mut<H: ResourceHandler>(&mut self, handler: H) {
        self.handlers.push(Arc::new(handler));
    }

    /// Append an already shared handler.
    pub fn register_arc(mut self, handler: Arc<dyn DynResourceHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Append a boxed handler.
    pub fn register_boxed(mut self, handler: Box<dyn DynResourceHandler>) -> Self {
        self.handlers.push(Arc::from(handler));
        self
    }

    /// Append every handler submitted with [`register_handler!`], ordered by
    /// `(priority, name)`.
    ///
    /// [`register_handler!`]: crate::register_handler
    #[cfg(feature = "inventory")]
    pub fn register_collected(mut self) -> Self {
        for registration in crate::collected::sorted() {
            self.handlers.push(Arc::from((registration.factory)()));
        }
        self
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the builder has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Build the immutable Registry.
    pub fn build(self) -> Registry {
        let entries = self
            .handlers
            .into_iter()
            .enumerate()
            .map(|(index, handler)| HandlerEntry {
                id: HandlerId::new(index),
                capabilities: (*handler).capabilities_dyn(),
                handler,
            })
            .collect();
        Registry { entries }
    }
}

// ============================================================================
// Registry - immutable, thread-safe handler storage
// ============================================================================

/// An immutable, thread-safe, ordered set of handlers.
///
/// Created by calling [`RegistryBuilder::build`]. There is no removal; build
/// a new registry to change the set.
pub struct Registry {
    entries: Vec<HandlerEntry>,
}

impl Registry {
    /// Iterate over all handlers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.entries.iter()
    }

    /// Iterate over handlers that take part in the rewrite phase.
    pub fn rewriters(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.with_capability(Capabilities::REWRITE)
    }

    /// Iterate over handlers that take part in the load phase.
    pub fn loaders(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.with_capability(Capabilities::LOAD)
    }

    fn with_capability(&self, capability: Capabilities) -> impl Iterator<Item = &HandlerEntry> {
        self.entries
            .iter()
            .filter(move |e| e.capabilities.contains(capability))
    }

    /// Look up a handler by slot.
    pub fn get(&self, id: HandlerId) -> Option<&HandlerEntry> {
        self.entries.get(id.index())
    }

    /// Get the number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}
