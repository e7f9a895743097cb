//! Reload command executor.
//!
//! Rebuilds the command table from the directories the bot was started
//! with. Command files referencing it should require `ADMINISTRATOR`.

use async_trait::async_trait;
use log::info;

use crate::{
    bot::Bot,
    commands::{CommandExecutor, CommandInvocation},
    platform::{Embed, INFO_COLOR},
};

/// Reloads every command and interaction file.
#[derive(Debug, Default)]
pub struct ReloadExecutor;

#[async_trait]
impl CommandExecutor for ReloadExecutor {
    async fn execute(&self, bot: &Bot, invocation: &CommandInvocation) -> anyhow::Result<()> {
        info!(
            "@{} requested a reload on ({}#{})",
            invocation.user.name, invocation.guild.name, invocation.channel.name
        );

        let loaded = bot.reload();

        let embed = Embed::new(INFO_COLOR).field(
            "Reloaded",
            &format!("{} command and interaction file(s) loaded.", loaded),
            false,
        );
        bot.outbound().reply_embed(&invocation.message, &embed);

        Ok(())
    }
}
