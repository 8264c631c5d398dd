//! Help command
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;

use crate::commands::category::Category;
use crate::commands::command::Command;
use crate::commands::container::CommandContainer;
use crate::commands::context::CommandContext;
use crate::commands::priority::Priority;

pub struct HelpCommand;

impl HelpCommand {
    fn is_listed(container: &CommandContainer) -> bool {
        !matches!(container.priority(), Priority::Hidden | Priority::Ignored)
    }

    fn overview(ctx: &CommandContext) -> String {
        let settings = ctx.guild_settings();
        let commands = ctx.registry.commands();
        let mut lines = vec!["**Available Commands:**".to_string()];

        for category in ctx.registry.categories().values() {
            let triggers: Vec<String> = commands
                .iter()
                .filter(|container| container.category().name() == category.name())
                .filter(|container| Self::is_listed(container))
                .map(|container| format!("`{}`", container.generate_command_trigger(settings)))
                .collect();

            if !triggers.is_empty() {
                lines.push(format!("**{}**: {}", category.name(), triggers.join(", ")));
            }
        }

        lines.push("Use `help <command>` to see how a command is used.".to_string());
        if let Some(category) = ctx.registry.categories().random(false, &mut rand::rng()) {
            lines.push(format!(
                "Try `help {}` to see the commands in a category.",
                category.name().to_lowercase()
            ));
        }
        lines.join("\n")
    }

    fn category_listing(ctx: &CommandContext, category: &Category) -> String {
        let settings = ctx.guild_settings();
        let mut lines = vec![format!("**{} Commands:**", category.name())];

        for container in ctx.registry.commands().iter() {
            if container.category().name() != category.name() || !Self::is_listed(container) {
                continue;
            }
            lines.push(format!(
                "`{}` - {}",
                container.generate_command_trigger(settings),
                container.command().description()
            ));
        }

        lines.join("\n")
    }

    fn details(ctx: &CommandContext, container: &CommandContainer) -> String {
        let settings = ctx.guild_settings();
        let mut lines = vec![
            format!("**{}** (`{}`)", container.name(), container.generate_command_trigger(settings)),
            container.command().description().to_string(),
            String::new(),
            "**Usage:**".to_string(),
        ];
        lines.extend(container.generate_usage_instructions(settings));

        let examples = container.generate_example_usage(settings);
        if !examples.is_empty() {
            lines.push(String::new());
            lines.push("**Example:**".to_string());
            lines.extend(examples);
        }

        let related: Vec<String> = container
            .command()
            .relations()
            .into_iter()
            .filter_map(|id| ctx.registry.get_command_by_id(id))
            .filter(|relation| Self::is_listed(relation))
            .map(|relation| format!("`{}`", relation.generate_command_trigger(settings)))
            .collect();
        if !related.is_empty() {
            lines.push(String::new());
            lines.push(format!("**See also:** {}", related.join(", ")));
        }

        let requirements = container.middleware_descriptions();
        if !requirements.is_empty() {
            lines.push(String::new());
            lines.push("**Requirements:**".to_string());
            lines.extend(requirements.into_iter().map(|line| format!("- {line}")));
        }

        if let Some(uri) = container.source_uri() {
            lines.push(String::new());
            lines.push(format!("Source: <{uri}>"));
        }

        lines.join("\n")
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "Help Command"
    }

    fn description(&self) -> &str {
        "Lists the available commands, or shows how a single command is used."
    }

    fn usage_instructions(&self) -> Vec<String> {
        vec![
            "`:command` - Lists every command".to_string(),
            "`:command <command>` - Shows help for the given command".to_string(),
        ]
    }

    fn example_usage(&self) -> Vec<String> {
        vec!["`:command goodbye`".to_string()]
    }

    fn triggers(&self) -> &[&'static str] {
        &["help"]
    }

    fn category(&self) -> &str {
        "Help"
    }

    async fn execute(&self, ctx: &CommandContext, args: &[String]) -> Result<bool> {
        let Some(query) = args.first() else {
            ctx.reply(&Self::overview(ctx)).await?;
            return Ok(true);
        };

        let container = ctx
            .registry
            .get_command(query, ctx.guild_settings())
            .or_else(|| ctx.registry.get_lazy_command(query));

        if let Some(container) = container {
            ctx.reply(&Self::details(ctx, &container)).await?;
            return Ok(true);
        }

        if let Some(category) = ctx.registry.categories().from_lazy_name(query, true) {
            ctx.reply(&Self::category_listing(ctx, &category)).await?;
            return Ok(true);
        }

        ctx.make_error(&format!("No command or category called `{query}` was found."))
            .await?;
        Ok(false)
    }
}
