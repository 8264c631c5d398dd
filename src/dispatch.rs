//! # Dispatcher
//!
//! Turns an inbound message into at most one command invocation: resolve the
//! command (directly or through a guild alias), check the channel allows its
//! category, then drive the middleware stack into the command body.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::alias::resolve_alias;
use crate::commands::container::ResolvedCommand;
use crate::commands::context::CommandContext;
use crate::commands::registry::CommandRegistry;
use crate::core::Config;
use crate::middleware::MiddlewareStack;
use crate::platform::{InboundMessage, Platform};
use crate::settings::{GuildSettings, SettingsProvider};

/// Generic reply for unexpected command errors
pub const APOLOGY: &str = "Sorry, I encountered an error processing your message.";

/// How a single dispatch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Bot-authored or empty message
    Ignored,
    NotFound,
    /// The channel has the command's category disabled
    CategoryDisabled,
    /// A middleware stopped the chain before the command body
    Aborted,
    Completed,
    /// The body reported failure or an unexpected error occurred
    Failed,
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    settings: Arc<dyn SettingsProvider>,
    config: Arc<Config>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        settings: Arc<dyn SettingsProvider>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            registry,
            settings,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Find the command a message invokes, guild prefixes first, then aliases
    pub fn resolve(
        &self,
        message: &InboundMessage,
        settings: Option<&GuildSettings>,
    ) -> Option<ResolvedCommand> {
        self.registry
            .get_command(&message.content, settings)
            .map(ResolvedCommand::Container)
            .or_else(|| resolve_alias(&self.registry, settings, &message.content))
    }

    pub async fn dispatch(&self, platform: Arc<dyn Platform>, message: InboundMessage) -> DispatchOutcome {
        if message.author_is_bot || message.content.trim().is_empty() {
            return DispatchOutcome::Ignored;
        }

        let request_id = Uuid::new_v4();
        let settings = self.fetch_settings(request_id, &message).await;

        let Some(resolved) = self.resolve(&message, settings.as_ref()) else {
            debug!("[{request_id}] No command matches {:?}", message.command_token());
            return DispatchOutcome::NotFound;
        };
        let container = Arc::clone(resolved.container());

        let disabled = settings
            .as_ref()
            .and_then(|settings| settings.channel(message.channel_id))
            .is_some_and(|channel| !channel.is_category_enabled(container.category()));
        if disabled {
            debug!(
                "[{request_id}] {} is disabled in channel {}",
                container.category().name(),
                message.channel_id
            );
            return DispatchOutcome::CategoryDisabled;
        }

        let arguments = resolved.arguments_with(message.arguments());
        info!(
            "[{request_id}] Running \"{}\" for user {} (alias: {})",
            container.name(),
            message.author_id,
            resolved.is_alias()
        );

        let ctx = CommandContext {
            message,
            settings,
            platform,
            settings_provider: Arc::clone(&self.settings),
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
            request_id,
        };

        let body_invoked = AtomicBool::new(false);
        let result = MiddlewareStack::new(&ctx, &container, &arguments, &body_invoked)
            .next()
            .await;

        let invoked = body_invoked.load(Ordering::SeqCst);
        if invoked {
            self.registry.counters().increment(container.simple_name());
        }

        match result {
            Ok(true) => DispatchOutcome::Completed,
            Ok(false) if !invoked => {
                debug!("[{request_id}] Middleware stopped \"{}\"", container.name());
                DispatchOutcome::Aborted
            }
            Ok(false) => {
                debug!("[{request_id}] \"{}\" reported failure", container.name());
                DispatchOutcome::Failed
            }
            Err(e) => {
                error!("[{request_id}] Error running \"{}\": {e:#}", container.name());
                if let Err(why) = ctx.reply(APOLOGY).await {
                    error!("[{request_id}] Failed to send error message: {why}");
                }
                DispatchOutcome::Failed
            }
        }
    }

    /// Missing or unreachable settings behave like a guild without overrides
    async fn fetch_settings(&self, request_id: Uuid, message: &InboundMessage) -> Option<GuildSettings> {
        let guild_id = message.guild_id?;
        match self.settings.fetch_guild_settings(guild_id).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("[{request_id}] Failed to fetch settings for guild {guild_id}: {e}");
                None
            }
        }
    }
}
