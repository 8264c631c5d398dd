//! Permission guard middleware
//!
//! Specifier: `require:<user|bot|all>,<node>[,<node>...]`, for example
//! `require:user,general.manage_server`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serenity::model::permissions::Permissions;

use super::{Middleware, MiddlewareStack};
use crate::commands::context::CommandContext;

/// Whose permissions a binding checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionScope {
    User,
    Bot,
    All,
}

impl PermissionScope {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "user" => Some(PermissionScope::User),
            "bot" => Some(PermissionScope::Bot),
            "all" => Some(PermissionScope::All),
            _ => None,
        }
    }

    fn checks_user(self) -> bool {
        matches!(self, PermissionScope::User | PermissionScope::All)
    }

    fn checks_bot(self) -> bool {
        matches!(self, PermissionScope::Bot | PermissionScope::All)
    }
}

/// A named permission node, e.g. `general.manage_server`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionNode {
    pub node: &'static str,
    pub permission: Permissions,
    pub name: &'static str,
}

const NODES: &[PermissionNode] = &[
    node("general.administrator", Permissions::ADMINISTRATOR, "Administrator"),
    node("general.manage_server", Permissions::MANAGE_GUILD, "Manage Server"),
    node("general.manage_roles", Permissions::MANAGE_ROLES, "Manage Roles"),
    node("general.manage_channels", Permissions::MANAGE_CHANNELS, "Manage Channels"),
    node("general.manage_nicknames", Permissions::MANAGE_NICKNAMES, "Manage Nicknames"),
    node("general.manage_webhooks", Permissions::MANAGE_WEBHOOKS, "Manage Webhooks"),
    node("general.kick_members", Permissions::KICK_MEMBERS, "Kick Members"),
    node("general.ban_members", Permissions::BAN_MEMBERS, "Ban Members"),
    node("general.create_instant_invite", Permissions::CREATE_INSTANT_INVITE, "Create Instant Invite"),
    node("general.change_nickname", Permissions::CHANGE_NICKNAME, "Change Nickname"),
    node("text.send_messages", Permissions::SEND_MESSAGES, "Send Messages"),
    node("text.manage_messages", Permissions::MANAGE_MESSAGES, "Manage Messages"),
    node("text.embed_links", Permissions::EMBED_LINKS, "Embed Links"),
    node("text.attach_files", Permissions::ATTACH_FILES, "Attach Files"),
    node("text.read_message_history", Permissions::READ_MESSAGE_HISTORY, "Read Message History"),
    node("text.mention_everyone", Permissions::MENTION_EVERYONE, "Mention Everyone"),
    node("text.add_reactions", Permissions::ADD_REACTIONS, "Add Reactions"),
    node("text.use_external_emojis", Permissions::USE_EXTERNAL_EMOJIS, "Use External Emojis"),
    node("voice.connect", Permissions::CONNECT, "Connect"),
    node("voice.speak", Permissions::SPEAK, "Speak"),
    node("voice.mute_members", Permissions::MUTE_MEMBERS, "Mute Members"),
    node("voice.deafen_members", Permissions::DEAFEN_MEMBERS, "Deafen Members"),
    node("voice.move_members", Permissions::MOVE_MEMBERS, "Move Members"),
];

const fn node(node: &'static str, permission: Permissions, name: &'static str) -> PermissionNode {
    PermissionNode {
        node,
        permission,
        name,
    }
}

impl PermissionNode {
    pub fn from_node(node: &str) -> Option<&'static PermissionNode> {
        NODES
            .iter()
            .find(|candidate| candidate.node.eq_ignore_ascii_case(node.trim()))
    }

    /// Administrators hold every node
    pub fn is_granted(&self, held: Permissions) -> bool {
        held.contains(Permissions::ADMINISTRATOR) || held.contains(self.permission)
    }
}

fn join_names(nodes: &[&PermissionNode]) -> String {
    nodes
        .iter()
        .map(|node| node.name)
        .collect::<Vec<_>>()
        .join("`, `")
}

/// Blocks the command unless the user and/or the bot hold every listed node
///
/// Missing user and bot permissions are reported separately, either one
/// stops the command.
pub struct RequirePermissionMiddleware;

#[async_trait]
impl Middleware for RequirePermissionMiddleware {
    fn required_arguments(&self) -> usize {
        2
    }

    fn describe(&self, args: &[String]) -> Option<String> {
        let scope = PermissionScope::from_name(args.first()?)?;
        let nodes: Vec<&PermissionNode> = args[1..]
            .iter()
            .filter_map(|node| PermissionNode::from_node(node))
            .collect();
        if nodes.is_empty() {
            return None;
        }

        let holder = match scope {
            PermissionScope::User => "You need",
            PermissionScope::Bot => "The bot needs",
            PermissionScope::All => "You and the bot need",
        };
        Some(format!("{holder} the `{}` permission(s)", join_names(&nodes)))
    }

    async fn handle(
        &self,
        ctx: &CommandContext,
        stack: MiddlewareStack<'_>,
        args: &[String],
    ) -> Result<bool> {
        let Some(guild_id) = ctx.message.guild_id else {
            return stack.next().await;
        };

        let Some(scope) = PermissionScope::from_name(&args[0]) else {
            warn!(
                "[{}] \"{}\" uses an invalid permission scope: {}",
                ctx.request_id,
                stack.container().name(),
                args[0]
            );
            return stack.next().await;
        };

        let mut nodes = Vec::with_capacity(args.len() - 1);
        for raw in &args[1..] {
            match PermissionNode::from_node(raw) {
                Some(node) => nodes.push(node),
                None => warn!(
                    "[{}] \"{}\" requires an unknown permission node: {raw}",
                    ctx.request_id,
                    stack.container().name()
                ),
            }
        }

        let channel_id = ctx.message.channel_id;

        let missing_user: Vec<&PermissionNode> = if scope.checks_user() {
            let held = ctx
                .platform
                .member_permissions(guild_id, channel_id, ctx.message.author_id)
                .await?;
            nodes.iter().copied().filter(|node| !node.is_granted(held)).collect()
        } else {
            Vec::new()
        };

        let missing_bot: Vec<&PermissionNode> = if scope.checks_bot() {
            let held = ctx
                .platform
                .member_permissions(guild_id, channel_id, ctx.platform.bot_user_id())
                .await?;
            nodes.iter().copied().filter(|node| !node.is_granted(held)).collect()
        } else {
            Vec::new()
        };

        if !missing_user.is_empty() {
            ctx.make_error(&format!(
                "You're missing the required permission node for this command:\n`{}`",
                join_names(&missing_user)
            ))
            .await?;
        }

        if !missing_bot.is_empty() {
            ctx.make_error(&format!(
                "I'm missing the following permission to run this command successfully:\n`{}`",
                join_names(&missing_bot)
            ))
            .await?;
        }

        if missing_user.is_empty() && missing_bot.is_empty() {
            stack.next().await
        } else {
            Ok(false)
        }
    }
}
