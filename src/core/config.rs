//! # Bot Configuration
//!
//! Environment driven runtime configuration plus the optional YAML category table.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::commands::category::Category;
use crate::core::error::ConfigurationError;

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub log_level: String,
    /// User ids allowed through the `isBotAdmin` middleware
    pub bot_admins: HashSet<u64>,
    pub guild_settings_path: String,
    pub categories_path: Option<String>,
    /// Template for command source links, `{module}` and `{command}` are replaced
    pub source_uri_template: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token =
            std::env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        let bot_admins = match std::env::var("BOT_ADMINS") {
            Ok(raw) => parse_admin_ids(&raw)?,
            Err(_) => HashSet::new(),
        };

        Ok(Self {
            discord_token,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            bot_admins,
            guild_settings_path: std::env::var("GUILD_SETTINGS_PATH")
                .unwrap_or_else(|_| "guilds.yaml".to_string()),
            categories_path: std::env::var("CATEGORIES_PATH").ok(),
            source_uri_template: std::env::var("SOURCE_URI_TEMPLATE").ok(),
        })
    }

    pub fn is_bot_admin(&self, user_id: u64) -> bool {
        self.bot_admins.contains(&user_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            log_level: "info".to_string(),
            bot_admins: HashSet::new(),
            guild_settings_path: "guilds.yaml".to_string(),
            categories_path: None,
            source_uri_template: None,
        }
    }
}

fn parse_admin_ids(raw: &str) -> Result<HashSet<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>()
                .with_context(|| format!("Invalid user id in BOT_ADMINS: {id}"))
        })
        .collect()
}

/// YAML category table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryConfig {
    pub categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub prefix: String,
    /// Global categories can not be disabled per channel
    #[serde(default)]
    pub global: bool,
}

impl CategoryConfig {
    /// Load the category table from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: CategoryConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.categories.is_empty() {
            return Err(ConfigurationError::InvalidCategories(
                "at least one category is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigurationError::InvalidCategories(
                    "category name may not be empty".to_string(),
                ));
            }

            if !seen.insert(category.name.to_lowercase()) {
                return Err(ConfigurationError::InvalidCategories(format!(
                    "category {} is defined more than once",
                    category.name
                )));
            }

            if !is_valid_prefix(&category.prefix) {
                return Err(ConfigurationError::InvalidCategories(format!(
                    "category {} has an invalid prefix: {:?}",
                    category.name, category.prefix
                )));
            }
        }
        Ok(())
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
            .into_iter()
            .map(|def| Category::new(def.name, def.prefix, def.global))
            .collect()
    }
}

/// A prefix must be non-empty and free of whitespace, or no first token can match it
pub fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && !prefix.chars().any(char::is_whitespace)
}
