//! Process-wide handler registration.
//!
//! Handlers submitted with [`register_handler!`] anywhere in the final binary
//! are gathered at link time by `inventory` and appended to a registry with
//! [`RegistryBuilder::register_collected`].
//!
//! [`register_handler!`]: crate::register_handler
//! [`RegistryBuilder::register_collected`]: crate::RegistryBuilder::register_collected

use tapwire_core::DynResourceHandler;

/// A statically submitted handler.
pub struct HandlerRegistration {
    /// Name used to order registrations of equal priority.
    pub name: &'static str,
    /// Ordering key (higher = earlier in the chain).
    pub priority: i32,
    /// Builds a fresh handler instance.
    pub factory: fn() -> Box<dyn DynResourceHandler>,
}

impl HandlerRegistration {
    /// Create a registration.
    pub const fn new(
        name: &'static str,
        priority: i32,
        factory: fn() -> Box<dyn DynResourceHandler>,
    ) -> Self {
        Self {
            name,
            priority,
            factory,
        }
    }
}

inventory::collect!(HandlerRegistration);

/// Every collected registration, highest priority first, ties by name.
pub(crate) fn sorted() -> Vec<&'static HandlerRegistration> {
    let mut registrations: Vec<_> = inventory::iter::<HandlerRegistration>
        .into_iter()
        .collect();
    registrations.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.name.cmp(b.name)));
    registrations
}

/// Submit a handler for collection by [`RegistryBuilder::register_collected`].
///
/// The handler expression is evaluated each time a registry collects it, so
/// it must not capture local variables.
///
/// # Example
///
/// ```rust,ignore
/// register_handler!("gap-exec", EmptyResponse::new("gap-exec"));
/// register_handler!("foo-to-file", 10, SchemeRewrite::new("foo", "file"));
/// ```
///
/// [`RegistryBuilder::register_collected`]: crate::RegistryBuilder::register_collected
#[macro_export]
macro_rules! register_handler {
    ($name:expr, $handler:expr $(,)?) => {
        $crate::register_handler!($name, 0, $handler);
    };
    ($name:expr, $priority:expr, $handler:expr $(,)?) => {
        $crate::inventory::submit! {
            $crate::collected::HandlerRegistration::new($name, $priority, {
                fn factory() -> ::std::boxed::Box<dyn $crate::tapwire_core::DynResourceHandler> {
                    ::std::boxed::Box::new($handler)
                }
                factory
            })
        }
    };
}
