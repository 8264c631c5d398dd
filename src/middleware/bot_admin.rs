//! Bot administrator guard
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use super::{Middleware, MiddlewareStack};
use crate::commands::context::CommandContext;

/// Only lets users listed in `BOT_ADMINS` through
pub struct BotAdminMiddleware;

#[async_trait]
impl Middleware for BotAdminMiddleware {
    fn describe(&self, _args: &[String]) -> Option<String> {
        Some("Can only be used by a bot administrator".to_string())
    }

    async fn handle(
        &self,
        ctx: &CommandContext,
        stack: MiddlewareStack<'_>,
        _args: &[String],
    ) -> Result<bool> {
        if ctx.config.is_bot_admin(ctx.message.author_id.0) {
            return stack.next().await;
        }

        info!(
            "[{}] User {} is not a bot admin, blocked \"{}\"",
            ctx.request_id,
            ctx.message.author_id,
            stack.container().name()
        );
        ctx.make_error("This command can only be used by a bot administrator.")
            .await?;
        Ok(false)
    }
}
