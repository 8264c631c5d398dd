//! Channel greeting toggles
//!
//! Handles: goodbye, welcome
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::any::TypeId;

use crate::commands::command::{relation, Command};
use crate::commands::context::CommandContext;
use crate::settings::ChannelSettings;

const MIDDLEWARE: &[&str] = &["require:user,general.manage_server", "throttle:channel,1,5"];

/// Toggles goodbye messages for the channel the command is used in
pub struct GoodbyeCommand;

/// Toggles welcome messages for the channel the command is used in
pub struct WelcomeCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelFlag {
    Goodbye,
    Welcome,
}

impl ChannelFlag {
    fn label(self) -> &'static str {
        match self {
            ChannelFlag::Goodbye => "Goodbye",
            ChannelFlag::Welcome => "Welcome",
        }
    }

    fn value(self, channel: &mut ChannelSettings) -> &mut bool {
        match self {
            ChannelFlag::Goodbye => &mut channel.goodbye,
            ChannelFlag::Welcome => &mut channel.welcome,
        }
    }

    fn get(self, channel: &ChannelSettings) -> bool {
        match self {
            ChannelFlag::Goodbye => channel.goodbye,
            ChannelFlag::Welcome => channel.welcome,
        }
    }
}

/// Loose on/off parsing for toggle arguments
pub fn parse_fuzzy_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "y" | "enable" | "enabled" | "1" => Some(true),
        "off" | "false" | "no" | "n" | "disable" | "disabled" | "0" => Some(false),
        _ => None,
    }
}

async fn toggle_channel_flag(ctx: &CommandContext, args: &[String], flag: ChannelFlag) -> Result<bool> {
    if !ctx.message.is_guild() {
        ctx.make_error("This command can only be used in a server.").await?;
        return Ok(false);
    }

    let requested = match args.first() {
        None => None,
        Some(argument) => match parse_fuzzy_bool(argument) {
            Some(enabled) => Some(enabled),
            None => {
                ctx.make_error(&format!("`{argument}` is not a valid option, use `on` or `off`."))
                    .await?;
                return Ok(false);
            }
        },
    };

    // Toggle against the stored value, not the dispatch snapshot
    let channel_id = ctx.message.channel_id;
    let updated = ctx
        .update_settings(move |settings| {
            let value = flag.value(settings.channel_mut(channel_id));
            *value = requested.unwrap_or(!*value);
        })
        .await;

    let enabled = match updated {
        Ok(settings) => settings.channel(channel_id).is_some_and(|channel| flag.get(channel)),
        Err(e) => {
            warn!("[{}] {e:#}", ctx.request_id);
            ctx.make_error(&format!("Sorry, I {e}, please try again later."))
                .await?;
            return Ok(false);
        }
    };

    let state = if enabled { "enabled" } else { "disabled" };
    info!(
        "[{}] {} messages {state} in channel {}",
        ctx.request_id,
        flag.label(),
        ctx.message.channel_id
    );
    ctx.reply(&format!(
        "{} messages have been **{state}** for this channel.",
        flag.label()
    ))
    .await?;
    Ok(true)
}

#[async_trait]
impl Command for GoodbyeCommand {
    fn name(&self) -> &str {
        "Goodbye Command"
    }

    fn description(&self) -> &str {
        "Toggles the goodbye messages on or off for the current channel."
    }

    fn usage_instructions(&self) -> Vec<String> {
        vec![
            "`:command` - Toggles the goodbye feature on/off".to_string(),
            "`:command <on|off>` - Turns the goodbye feature on or off".to_string(),
        ]
    }

    fn example_usage(&self) -> Vec<String> {
        vec!["`:command off`".to_string()]
    }

    fn triggers(&self) -> &[&'static str] {
        &["goodbye", "bye"]
    }

    fn middleware(&self) -> &[&'static str] {
        MIDDLEWARE
    }

    fn relations(&self) -> Vec<TypeId> {
        vec![relation::<WelcomeCommand>()]
    }

    fn category(&self) -> &str {
        "Administration"
    }

    async fn execute(&self, ctx: &CommandContext, args: &[String]) -> Result<bool> {
        toggle_channel_flag(ctx, args, ChannelFlag::Goodbye).await
    }
}

#[async_trait]
impl Command for WelcomeCommand {
    fn name(&self) -> &str {
        "Welcome Command"
    }

    fn description(&self) -> &str {
        "Toggles the welcome messages on or off for the current channel."
    }

    fn usage_instructions(&self) -> Vec<String> {
        vec![
            "`:command` - Toggles the welcome feature on/off".to_string(),
            "`:command <on|off>` - Turns the welcome feature on or off".to_string(),
        ]
    }

    fn triggers(&self) -> &[&'static str] {
        &["welcome", "hello"]
    }

    fn middleware(&self) -> &[&'static str] {
        MIDDLEWARE
    }

    fn relations(&self) -> Vec<TypeId> {
        vec![relation::<GoodbyeCommand>()]
    }

    fn category(&self) -> &str {
        "Administration"
    }

    async fn execute(&self, ctx: &CommandContext, args: &[String]) -> Result<bool> {
        toggle_channel_flag(ctx, args, ChannelFlag::Welcome).await
    }
}
