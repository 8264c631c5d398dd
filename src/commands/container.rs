//! Registry containers wrapping registered commands
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::any::TypeId;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::category::Category;
use super::command::{simple_type_name, Command};
use super::priority::Priority;
use crate::middleware::MiddlewareBinding;
use crate::settings::GuildSettings;

/// A registered command bound to its category, source link and middleware
///
/// Equality is by the wrapped command type.
pub struct CommandContainer {
    command: Arc<dyn Command>,
    category: Arc<Category>,
    source_uri: Option<String>,
    middleware: Vec<MiddlewareBinding>,
}

impl CommandContainer {
    pub(crate) fn new(
        command: Arc<dyn Command>,
        category: Arc<Category>,
        source_uri: Option<String>,
        middleware: Vec<MiddlewareBinding>,
    ) -> Self {
        Self {
            command,
            category,
            source_uri,
            middleware,
        }
    }

    pub fn command(&self) -> &Arc<dyn Command> {
        &self.command
    }

    pub fn category(&self) -> &Arc<Category> {
        &self.category
    }

    pub fn source_uri(&self) -> Option<&str> {
        self.source_uri.as_deref()
    }

    pub fn middleware(&self) -> &[MiddlewareBinding] {
        &self.middleware
    }

    pub fn name(&self) -> &str {
        self.command.name()
    }

    pub fn triggers(&self) -> &[&'static str] {
        self.command.triggers()
    }

    pub fn priority(&self) -> Priority {
        self.command.priority()
    }

    pub fn command_id(&self) -> TypeId {
        self.command.command_id()
    }

    /// Type name without its module path, used as the execution counter label
    pub fn simple_name(&self) -> &'static str {
        simple_type_name(self.command.type_name())
    }

    pub fn is_same(&self, command: &dyn Command) -> bool {
        self.command_id() == command.command_id()
    }

    /// The command's own prefix override, else its category prefix
    pub fn default_prefix(&self) -> &str {
        self.command
            .prefix()
            .unwrap_or_else(|| self.category.prefix())
    }

    /// Prefix in effect for a guild, honouring the guild's category override
    pub fn prefix_for<'a>(&'a self, settings: Option<&'a GuildSettings>) -> &'a str {
        settings
            .and_then(|settings| settings.prefix_for(&self.category))
            .unwrap_or_else(|| self.default_prefix())
    }

    /// True if `candidate` equals `prefix + trigger` for any trigger, ignoring case
    pub fn matches(&self, candidate: &str, prefix: &str) -> bool {
        self.triggers().iter().any(|own| {
            case_folded(candidate.chars()).eq(case_folded(prefix.chars().chain(own.chars())))
        })
    }

    /// True if `trigger` equals any trigger, ignoring case
    pub fn matches_trigger(&self, trigger: &str) -> bool {
        self.triggers()
            .iter()
            .any(|own| eq_ignore_case(own, trigger))
    }

    /// Prefix plus canonical trigger, e.g. `!goodbye`
    pub fn generate_command_trigger(&self, settings: Option<&GuildSettings>) -> String {
        let trigger = self.triggers().first().copied().unwrap_or_default();
        format!("{}{}", self.prefix_for(settings), trigger)
    }

    pub fn generate_usage_instructions(&self, settings: Option<&GuildSettings>) -> Vec<String> {
        self.with_trigger(self.command.usage_instructions(), settings)
    }

    pub fn generate_example_usage(&self, settings: Option<&GuildSettings>) -> Vec<String> {
        self.with_trigger(self.command.example_usage(), settings)
    }

    fn with_trigger(&self, lines: Vec<String>, settings: Option<&GuildSettings>) -> Vec<String> {
        let trigger = self.generate_command_trigger(settings);
        lines
            .into_iter()
            .map(|line| line.replace(":command", &trigger))
            .collect()
    }

    pub fn middleware_descriptions(&self) -> Vec<String> {
        self.middleware
            .iter()
            .filter_map(MiddlewareBinding::describe)
            .collect()
    }
}

fn case_folded(text: impl Iterator<Item = char>) -> impl Iterator<Item = char> {
    text.flat_map(char::to_lowercase)
}

/// Unicode-aware case-insensitive equality, `ÉCOUTE` equals `écoute`
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    case_folded(left.chars()).eq(case_folded(right.chars()))
}

impl PartialEq for CommandContainer {
    fn eq(&self, other: &Self) -> bool {
        self.command_id() == other.command_id()
    }
}

impl Eq for CommandContainer {}

impl fmt::Debug for CommandContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContainer")
            .field("command", &self.command.name())
            .field("category", &self.category.name())
            .field("triggers", &self.triggers())
            .field("priority", &self.priority())
            .finish()
    }
}

/// A container reached through a guild alias that carries fixed leading arguments
#[derive(Debug, Clone)]
pub struct AliasCommandContainer {
    container: Arc<CommandContainer>,
    alias_arguments: Vec<String>,
}

impl AliasCommandContainer {
    pub fn new(container: Arc<CommandContainer>, alias_arguments: Vec<String>) -> Self {
        Self {
            container,
            alias_arguments,
        }
    }

    pub fn container(&self) -> &Arc<CommandContainer> {
        &self.container
    }

    pub fn alias_arguments(&self) -> &[String] {
        &self.alias_arguments
    }
}

impl Deref for AliasCommandContainer {
    type Target = CommandContainer;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

/// Result of resolving a message to a command
#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Container(Arc<CommandContainer>),
    Alias(AliasCommandContainer),
}

impl ResolvedCommand {
    pub fn container(&self) -> &Arc<CommandContainer> {
        match self {
            ResolvedCommand::Container(container) => container,
            ResolvedCommand::Alias(alias) => alias.container(),
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, ResolvedCommand::Alias(_))
    }

    pub fn alias_arguments(&self) -> &[String] {
        match self {
            ResolvedCommand::Container(_) => &[],
            ResolvedCommand::Alias(alias) => alias.alias_arguments(),
        }
    }

    /// Alias arguments followed by the arguments the user typed
    pub fn arguments_with(&self, user_arguments: Vec<String>) -> Vec<String> {
        let alias = self.alias_arguments();
        if alias.is_empty() {
            return user_arguments;
        }

        let mut arguments = Vec::with_capacity(alias.len() + user_arguments.len());
        arguments.extend_from_slice(alias);
        arguments.extend(user_arguments);
        arguments
    }
}
