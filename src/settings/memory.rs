//! In-memory settings provider backed by an optional YAML file
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serenity::model::id::GuildId;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::{GuildSettings, SettingsProvider, SettingsUpdate};

/// On-disk layout of the settings file
#[derive(Debug, Default, Deserialize, Serialize)]
struct SettingsFile {
    #[serde(default)]
    guilds: BTreeMap<u64, GuildSettings>,
}

/// Settings held in a concurrent map, optionally written back to YAML on save
#[derive(Default)]
pub struct MemorySettingsProvider {
    guilds: DashMap<u64, GuildSettings>,
    path: Option<PathBuf>,
    /// Serializes writes to `path`
    write_lock: Mutex<()>,
}

impl MemorySettingsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a YAML file, saves are written back to the same file
    ///
    /// A missing file starts with no guilds.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file: SettingsFile = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            info!("No guild settings found at {} - starting empty", path.display());
            SettingsFile::default()
        };

        let guilds = DashMap::new();
        for (id, mut settings) in file.guilds {
            for category in settings.remove_invalid_prefixes() {
                warn!("Guild {id} has an invalid prefix override for {category} - ignoring it");
            }
            guilds.insert(id, settings);
        }

        Ok(Self {
            guilds,
            path: Some(path),
            write_lock: Mutex::new(()),
        })
    }

    pub fn insert(&self, guild_id: GuildId, settings: GuildSettings) {
        self.guilds.insert(guild_id.0, settings);
    }

    async fn write_back(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        // Snapshot under the lock so the last write always carries the newest state
        let _guard = self.write_lock.lock().await;
        let file = SettingsFile {
            guilds: self
                .guilds
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
        };
        let contents = serde_yaml::to_string(&file)?;
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Wrote {} guild settings to {}", file.guilds.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl SettingsProvider for MemorySettingsProvider {
    async fn fetch_guild_settings(&self, guild_id: GuildId) -> Result<Option<GuildSettings>> {
        Ok(self.guilds.get(&guild_id.0).map(|entry| entry.value().clone()))
    }

    async fn save_guild_settings(&self, guild_id: GuildId, settings: &GuildSettings) -> Result<()> {
        self.guilds.insert(guild_id.0, settings.clone());
        self.write_back().await
    }

    async fn update_guild_settings(
        &self,
        guild_id: GuildId,
        update: SettingsUpdate,
    ) -> Result<GuildSettings> {
        let updated = {
            let mut entry = self.guilds.entry(guild_id.0).or_default();
            update(entry.value_mut());
            entry.value().clone()
        };
        self.write_back().await?;
        Ok(updated)
    }
}
