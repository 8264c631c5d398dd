//! Guild alias resolution
//!
//! Guilds can define shorthands such as `"+p" -> "!play queue"`. An alias
//! resolves to the registered command named by the first word of its target,
//! and the remaining words become fixed leading arguments.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use log::debug;
use std::sync::Arc;

use super::container::{AliasCommandContainer, CommandContainer, ResolvedCommand};
use super::registry::CommandRegistry;
use crate::settings::GuildSettings;

/// Resolve `candidate` through the guild's aliases
///
/// Every alias key that is a prefix of the lower-cased first token is a
/// candidate. Alias targets are looked up with the default prefix, then by
/// trigger alone for targets written without a prefix. The highest priority
/// target wins, ties go to the alias key that sorts first.
pub fn resolve_alias(
    registry: &CommandRegistry,
    settings: Option<&GuildSettings>,
    candidate: &str,
) -> Option<ResolvedCommand> {
    let settings = settings?;
    if settings.aliases.is_empty() {
        return None;
    }

    let token = candidate.split_whitespace().next()?.to_lowercase();
    let mut best: Option<(Arc<CommandContainer>, Vec<String>)> = None;

    for (alias, target) in &settings.aliases {
        let key = alias.to_lowercase();
        if key.is_empty() || !token.starts_with(&key) {
            continue;
        }

        let mut parts = target.split_whitespace();
        let Some(head) = parts.next() else {
            continue;
        };

        let Some(container) = registry
            .get_raw_command(head)
            .or_else(|| registry.get_lazy_command(head))
        else {
            debug!("Alias {alias} points at unknown command {head}");
            continue;
        };

        let replaces = best
            .as_ref()
            .map_or(true, |(current, _)| container.priority().is_greater_than(current.priority()));

        if replaces {
            best = Some((container, parts.map(str::to_string).collect()));
        }
    }

    let (container, arguments) = best?;
    if arguments.is_empty() {
        Some(ResolvedCommand::Container(container))
    } else {
        Some(ResolvedCommand::Alias(AliasCommandContainer::new(container, arguments)))
    }
}
