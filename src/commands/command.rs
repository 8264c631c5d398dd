//! Command capability trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Prefix command trait replacing the slash-only handler trait

use anyhow::Result;
use async_trait::async_trait;
use std::any::TypeId;

use super::context::CommandContext;
use super::priority::Priority;

/// Trait for prefix commands
///
/// Each command is its own type. The registry compares commands by type, so
/// two values of the same command type are the same command.
///
/// # Example
///
/// ```ignore
/// pub struct PingCommand;
///
/// #[async_trait]
/// impl Command for PingCommand {
///     fn name(&self) -> &str { "Ping Command" }
///     fn description(&self) -> &str { "Checks that the bot is alive." }
///     fn triggers(&self) -> &[&'static str] { &["ping"] }
///     fn category(&self) -> &str { "Utility" }
///
///     async fn execute(&self, ctx: &CommandContext, _args: &[String]) -> Result<bool> {
///         ctx.reply("Pong!").await?;
///         Ok(true)
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// Human readable name, e.g. "Goodbye Command"
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Usage lines, `:command` is replaced with the command trigger
    fn usage_instructions(&self) -> Vec<String> {
        vec!["`:command`".to_string()]
    }

    fn example_usage(&self) -> Vec<String> {
        Vec::new()
    }

    /// Words that invoke the command after the prefix, the first one is canonical
    fn triggers(&self) -> &[&'static str];

    /// Middleware specifiers in execution order, e.g. `"throttle:user,2,5"`
    fn middleware(&self) -> &[&'static str] {
        &[]
    }

    /// Related command types, see [`relation`]
    fn relations(&self) -> Vec<TypeId> {
        Vec::new()
    }

    /// Name of the category the command belongs to
    fn category(&self) -> &str;

    /// Prefix override, the category prefix is used when `None`
    fn prefix(&self) -> Option<&str> {
        None
    }

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    /// Explicit source link, takes precedence over the derived one
    fn source_uri(&self) -> Option<&str> {
        None
    }

    /// Identity of the command type
    fn command_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Run the command body
    ///
    /// `Ok(false)` means the command failed in an expected way and has already
    /// told the user. `Err` is reserved for unexpected failures.
    async fn execute(&self, ctx: &CommandContext, args: &[String]) -> Result<bool>;
}

/// Reference a related command type
pub fn relation<T: Command>() -> TypeId {
    TypeId::of::<T>()
}

/// Last path segment of a type name, generics stripped
pub fn simple_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}
