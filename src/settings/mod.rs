//! # Guild Settings
//!
//! Per-guild aliases, prefix overrides and channel flags, read through the
//! [`SettingsProvider`] seam. The core treats fetched settings as a read-only
//! snapshot for the duration of one dispatch.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, GuildId};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::commands::category::Category;
use crate::core::is_valid_prefix;

pub use memory::MemorySettingsProvider;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GuildSettings {
    /// Alias key to command invocation, e.g. `"+p" -> "!play queue"`
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Lower-cased category name to prefix override
    #[serde(default)]
    pub prefixes: HashMap<String, String>,

    /// Channel id to channel flags
    #[serde(default)]
    pub channels: HashMap<u64, ChannelSettings>,
}

impl GuildSettings {
    /// The guild's prefix override for a category, invalid overrides are ignored
    pub fn prefix_for(&self, category: &Category) -> Option<&str> {
        self.prefixes
            .get(&category.name().to_lowercase())
            .map(String::as_str)
            .filter(|prefix| is_valid_prefix(prefix))
    }

    /// Drop prefix overrides that are empty or contain whitespace
    ///
    /// Returns the category names whose override was removed, sorted.
    pub fn remove_invalid_prefixes(&mut self) -> Vec<String> {
        let mut removed: Vec<String> = self
            .prefixes
            .iter()
            .filter(|(_, prefix)| !is_valid_prefix(prefix))
            .map(|(category, _)| category.clone())
            .collect();
        removed.sort();

        for category in &removed {
            self.prefixes.remove(category);
        }
        removed
    }

    pub fn channel(&self, channel_id: ChannelId) -> Option<&ChannelSettings> {
        self.channels.get(&channel_id.0)
    }

    pub fn channel_mut(&mut self, channel_id: ChannelId) -> &mut ChannelSettings {
        self.channels.entry(channel_id.0).or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelSettings {
    /// Lower-cased names of categories disabled in this channel
    #[serde(default)]
    pub disabled_categories: HashSet<String>,

    #[serde(default)]
    pub welcome: bool,

    #[serde(default)]
    pub goodbye: bool,
}

impl ChannelSettings {
    pub fn is_category_enabled(&self, category: &Category) -> bool {
        category.is_global()
            || !self
                .disabled_categories
                .contains(&category.name().to_lowercase())
    }
}

/// Storage backend for guild settings
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Fetch the settings for a guild, `Ok(None)` when the guild is unknown
    async fn fetch_guild_settings(&self, guild_id: GuildId) -> Result<Option<GuildSettings>>;

    /// Persist a settings change made by a command body
    async fn save_guild_settings(&self, guild_id: GuildId, settings: &GuildSettings) -> Result<()>;

    /// Apply `update` to the stored settings of a guild and persist the result
    ///
    /// Unknown guilds start from the defaults. The default implementation is a
    /// plain fetch and save, providers that can should apply the update
    /// atomically so overlapping commands in one guild do not lose writes.
    async fn update_guild_settings(
        &self,
        guild_id: GuildId,
        update: SettingsUpdate,
    ) -> Result<GuildSettings> {
        let mut settings = self.fetch_guild_settings(guild_id).await?.unwrap_or_default();
        update(&mut settings);
        self.save_guild_settings(guild_id, &settings).await?;
        Ok(settings)
    }
}

/// In-place change applied by [`SettingsProvider::update_guild_settings`]
pub type SettingsUpdate = Box<dyn FnOnce(&mut GuildSettings) + Send>;
