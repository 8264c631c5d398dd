//! User id lookup command
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;

use crate::commands::command::Command;
use crate::commands::context::CommandContext;

pub struct UserIdCommand;

#[async_trait]
impl Command for UserIdCommand {
    fn name(&self) -> &str {
        "User ID Command"
    }

    fn description(&self) -> &str {
        "Shows your Discord user id, or the id of the first user you mention."
    }

    fn usage_instructions(&self) -> Vec<String> {
        vec![
            "`:command` - Shows your own user id".to_string(),
            "`:command <@user>` - Shows the mentioned user's id".to_string(),
        ]
    }

    fn triggers(&self) -> &[&'static str] {
        &["userid", "uid"]
    }

    fn category(&self) -> &str {
        "Utility"
    }

    async fn execute(&self, ctx: &CommandContext, _args: &[String]) -> Result<bool> {
        let user_id = ctx
            .message
            .mentions
            .first()
            .copied()
            .unwrap_or(ctx.message.author_id);

        ctx.reply(&format!("👤 <@{user_id}> has the user id `{user_id}`"))
            .await?;
        Ok(true)
    }
}
