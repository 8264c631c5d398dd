//! Per-dispatch context handed to middleware and command bodies
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use super::registry::CommandRegistry;
use crate::core::{Config, PersistenceFailure};
use crate::platform::{InboundMessage, Platform};
use crate::settings::{GuildSettings, SettingsProvider};

/// Everything a command invocation can reach
///
/// The guild settings are the snapshot fetched when the dispatch started.
#[derive(Clone)]
pub struct CommandContext {
    pub message: InboundMessage,
    pub settings: Option<GuildSettings>,
    pub platform: Arc<dyn Platform>,
    pub settings_provider: Arc<dyn SettingsProvider>,
    pub registry: Arc<CommandRegistry>,
    pub config: Arc<Config>,
    pub request_id: Uuid,
}

impl CommandContext {
    pub fn guild_settings(&self) -> Option<&GuildSettings> {
        self.settings.as_ref()
    }

    /// Send a message to the channel the command was used in
    pub async fn reply(&self, content: &str) -> Result<()> {
        self.platform
            .send_message(self.message.channel_id, content)
            .await
    }

    /// Send an error message to the channel the command was used in
    pub async fn make_error(&self, content: &str) -> Result<()> {
        self.reply(&format!("❌ {content}")).await
    }

    /// Change the stored settings of the origin guild in place
    ///
    /// Starts from the provider's current state rather than the dispatch
    /// snapshot, so overlapping commands in one guild keep each other's changes.
    pub async fn update_settings<F>(&self, update: F) -> Result<GuildSettings, PersistenceFailure>
    where
        F: FnOnce(&mut GuildSettings) + Send + 'static,
    {
        let Some(guild_id) = self.message.guild_id else {
            return Err(anyhow::anyhow!("settings can only be saved inside a guild").into());
        };

        self.settings_provider
            .update_guild_settings(guild_id, Box::new(update))
            .await
            .map_err(PersistenceFailure::from)
    }
}
