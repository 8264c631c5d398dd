//! Per-dispatch middleware stack
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use log::warn;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::commands::container::CommandContainer;
use crate::commands::context::CommandContext;

/// Longest middleware chain a command may declare
pub const MAX_MIDDLEWARE_CHAIN: usize = 32;

pub type StackFuture<'a> = Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

/// The rest of a command's middleware chain, ending in the command body
///
/// `next` consumes the stack, so a middleware can continue at most once and
/// every middleware runs at most once per dispatch.
pub struct MiddlewareStack<'a> {
    ctx: &'a CommandContext,
    container: &'a CommandContainer,
    arguments: &'a [String],
    index: usize,
    body_invoked: &'a AtomicBool,
}

impl<'a> MiddlewareStack<'a> {
    pub fn new(
        ctx: &'a CommandContext,
        container: &'a CommandContainer,
        arguments: &'a [String],
        body_invoked: &'a AtomicBool,
    ) -> Self {
        Self {
            ctx,
            container,
            arguments,
            index: 0,
            body_invoked,
        }
    }

    pub fn container(&self) -> &'a CommandContainer {
        self.container
    }

    /// Arguments the command body will receive
    pub fn arguments(&self) -> &'a [String] {
        self.arguments
    }

    /// Run the next middleware, or the command body when none are left
    pub fn next(self) -> StackFuture<'a> {
        Box::pin(async move {
            let bindings = self.container.middleware();
            let mut index = self.index;

            while let Some(binding) = bindings.get(index) {
                let required = binding.middleware().required_arguments();
                if binding.arguments().len() >= required {
                    let rest = MiddlewareStack {
                        index: index + 1,
                        ..self
                    };
                    return binding
                        .middleware()
                        .handle(self.ctx, rest, binding.arguments())
                        .await;
                }

                warn!(
                    "[{}] \"{}\" is passing {} argument(s) to the {} middleware, {} are required",
                    self.ctx.request_id,
                    self.container.name(),
                    binding.arguments().len(),
                    binding.name(),
                    required
                );
                index += 1;
            }

            self.body_invoked.store(true, Ordering::SeqCst);
            self.container
                .command()
                .execute(self.ctx, self.arguments)
                .await
        })
    }
}
