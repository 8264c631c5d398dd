// Core layer - shared types, configuration and errors
pub mod core;

// Application layer
pub mod commands;
pub mod dispatch;
pub mod middleware;

// Collaborator seams
pub mod platform;
pub mod settings;

#[cfg(test)]
mod testing;

pub use core::{CategoryConfig, Config, ConfigurationError, PersistenceFailure};

pub use commands::{Category, CategoryRegistry, Command, CommandContext, CommandRegistry, Priority};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use middleware::{Middleware, MiddlewareRegistry};
pub use platform::{InboundMessage, Platform};
pub use settings::{GuildSettings, MemorySettingsProvider, SettingsProvider};
