//! Error taxonomy for command registration and persistence
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Configuration and persistence errors

use thiserror::Error;

/// Fatal startup errors raised while registering commands or loading categories
///
/// These indicate a programming or configuration mistake, the bot should
/// refuse to boot when one is returned.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{command} :: command category \"{category}\" is not registered")]
    MissingCategory { command: String, category: String },

    #[error("{command} :: command description may not be empty")]
    MissingDescription { command: String },

    #[error("{command} :: command must declare at least one trigger")]
    MissingTriggers { command: String },

    #[error("the \"{trigger}\" command trigger is already used by {existing}, {command} can not use it")]
    DuplicateTrigger {
        trigger: String,
        command: String,
        existing: String,
    },

    #[error("{command} :: middleware reference may not be null, {middleware} is not a valid middleware")]
    UnknownMiddleware { command: String, middleware: String },

    #[error("{command} :: declares {count} middleware, at most {max} are allowed")]
    MiddlewareChainTooLong {
        command: String,
        count: usize,
        max: usize,
    },

    #[error("invalid category configuration: {0}")]
    InvalidCategories(String),
}

/// The settings provider could not store a change made by a command body
#[derive(Debug, Error)]
#[error("failed to save the guild settings: {source}")]
pub struct PersistenceFailure {
    #[source]
    pub source: anyhow::Error,
}

impl From<anyhow::Error> for PersistenceFailure {
    fn from(source: anyhow::Error) -> Self {
        Self { source }
    }
}
