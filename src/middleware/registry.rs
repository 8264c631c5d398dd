//! Middleware name registry
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    BotAdminMiddleware, Middleware, MiddlewareBinding, RequirePermissionMiddleware,
    ThrottleMiddleware,
};

/// Maps middleware names to implementations, names are case-insensitive
///
/// Populated at startup and only read afterwards.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled `require`, `throttle` and `isBotAdmin` middleware
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("require", Arc::new(RequirePermissionMiddleware));
        registry.register("throttle", Arc::new(ThrottleMiddleware::new()));
        registry.register("isBotAdmin", Arc::new(BotAdminMiddleware));
        registry
    }

    pub fn register(&mut self, name: &str, middleware: Arc<dyn Middleware>) {
        self.middleware.insert(name.to_lowercase(), middleware);
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.middleware.contains_key(&name.to_lowercase())
    }

    /// Parse a specifier and resolve its middleware, `None` if the name is unknown
    pub fn bind(&self, specifier: &str) -> Option<MiddlewareBinding> {
        let (name, arguments) = MiddlewareBinding::split_specifier(specifier);
        let middleware = self.resolve(&name)?;
        Some(MiddlewareBinding::new(name, arguments, middleware))
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}
