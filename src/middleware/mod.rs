//! # Middleware
//!
//! Guards that run before a command body. Commands declare middleware as
//! specifier strings (`name:arg1,arg2`), which are bound against the
//! [`MiddlewareRegistry`] when the command is registered and driven by a
//! [`MiddlewareStack`] on every dispatch.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod bot_admin;
pub mod permission;
pub mod registry;
pub mod stack;
pub mod throttle;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::commands::context::CommandContext;

pub use bot_admin::BotAdminMiddleware;
pub use permission::RequirePermissionMiddleware;
pub use registry::MiddlewareRegistry;
pub use stack::{MiddlewareStack, MAX_MIDDLEWARE_CHAIN};
pub use throttle::ThrottleMiddleware;

/// A pre-execution guard
///
/// An implementation either calls `stack.next()` and returns its result, or
/// returns `Ok(false)` without calling it to stop the command. Stopping is
/// expected behaviour, the middleware tells the user why before returning.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Bindings with fewer arguments are skipped with a warning
    fn required_arguments(&self) -> usize {
        0
    }

    /// Help text describing what a binding with `args` requires
    fn describe(&self, _args: &[String]) -> Option<String> {
        None
    }

    async fn handle(
        &self,
        ctx: &CommandContext,
        stack: MiddlewareStack<'_>,
        args: &[String],
    ) -> Result<bool>;
}

/// A middleware resolved for one command together with its fixed arguments
#[derive(Clone)]
pub struct MiddlewareBinding {
    name: String,
    arguments: Vec<String>,
    middleware: Arc<dyn Middleware>,
}

impl MiddlewareBinding {
    pub fn new(name: impl Into<String>, arguments: Vec<String>, middleware: Arc<dyn Middleware>) -> Self {
        Self {
            name: name.into(),
            arguments,
            middleware,
        }
    }

    /// Split `name:arg1,arg2` into its name and arguments
    pub fn split_specifier(specifier: &str) -> (String, Vec<String>) {
        let (name, arguments) = match specifier.split_once(':') {
            Some((name, arguments)) => (name, arguments),
            None => (specifier, ""),
        };

        let arguments = arguments
            .split(',')
            .map(str::trim)
            .filter(|argument| !argument.is_empty())
            .map(str::to_string)
            .collect();

        (name.trim().to_string(), arguments)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn middleware(&self) -> &Arc<dyn Middleware> {
        &self.middleware
    }

    pub fn describe(&self) -> Option<String> {
        self.middleware.describe(&self.arguments)
    }
}

impl fmt::Debug for MiddlewareBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareBinding")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}
