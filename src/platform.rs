//! Chat platform seam
//!
//! The dispatcher never talks to Discord directly. Inbound events are turned
//! into [`InboundMessage`] values and every outbound side effect goes through
//! the [`Platform`] trait.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::permissions::Permissions;

/// Platform independent view of an incoming chat message
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub content: String,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub author_is_bot: bool,
    /// Users mentioned in the message, in order of appearance
    pub mentions: Vec<UserId>,
}

impl InboundMessage {
    pub fn new(content: impl Into<String>, channel_id: ChannelId, author_id: UserId) -> Self {
        Self {
            content: content.into(),
            guild_id: None,
            channel_id,
            author_id,
            author_is_bot: false,
            mentions: Vec::new(),
        }
    }

    pub fn in_guild(mut self, guild_id: GuildId) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn is_guild(&self) -> bool {
        self.guild_id.is_some()
    }

    /// First whitespace delimited token, the candidate command string
    pub fn command_token(&self) -> &str {
        self.content.split_whitespace().next().unwrap_or("")
    }

    /// Everything after the command token, split on whitespace
    pub fn arguments(&self) -> Vec<String> {
        self.content
            .split_whitespace()
            .skip(1)
            .map(str::to_string)
            .collect()
    }
}

/// Outbound capabilities the core needs from the chat client
#[async_trait]
pub trait Platform: Send + Sync {
    /// Send a plain message to a channel
    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()>;

    /// The bot's own user id
    fn bot_user_id(&self) -> UserId;

    /// Effective permissions of a guild member
    async fn member_permissions(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Permissions>;
}
