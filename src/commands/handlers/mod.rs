//! Bundled command implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 3.0.0: Prefix commands (help, goodbye, welcome, userid) replace the slash handlers
//! - 1.0.0: Initial extraction from the monolithic handler

pub mod goodbye;
pub mod help;
pub mod userid;

use std::sync::Arc;

use super::command::Command;
use super::registry::CommandRegistry;
use crate::core::ConfigurationError;

/// Module path commands are expected under when deriving source links
pub const MODULE_PATH: &str = module_path!();

/// Create all bundled commands
///
/// Returns a vector of commands ready to be registered with CommandRegistry.
pub fn create_all_commands() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(help::HelpCommand),
        Arc::new(goodbye::GoodbyeCommand),
        Arc::new(goodbye::WelcomeCommand),
        Arc::new(userid::UserIdCommand),
    ]
}

/// Register every bundled command, stopping at the first configuration error
pub fn register_all(registry: &CommandRegistry) -> Result<(), ConfigurationError> {
    for command in create_all_commands() {
        registry.register(command)?;
    }
    Ok(())
}
