//! Echo command executor.
//!
//! Repeats its arguments in the channel the command was called from. Mostly
//! useful to check argument splitting.

use async_trait::async_trait;
use log::debug;

use crate::{
    bot::Bot,
    commands::{CommandExecutor, CommandInvocation},
    platform::{ERROR_COLOR, Embed, INFO_COLOR},
};

/// Sends the arguments back, joined by single spaces.
#[derive(Debug, Default)]
pub struct EchoExecutor;

#[async_trait]
impl CommandExecutor for EchoExecutor {
    async fn execute(&self, bot: &Bot, invocation: &CommandInvocation) -> anyhow::Result<()> {
        debug!("handling echo command with {:?}", invocation.args);

        if invocation.args.is_empty() {
            let usage = Embed::new(ERROR_COLOR).title("[ERROR]").field(
                "Nothing to echo",
                &format!("Usage: `{}echo <text>`", bot.prefix()),
                false,
            );
            bot.outbound().reply_embed(&invocation.message, &usage);
            return Ok(());
        }

        let embed = Embed::new(INFO_COLOR).field(
            invocation.member.display_name(),
            &invocation.args.join(" "),
            false,
        );
        bot.outbound().send_embed(&invocation.channel, &embed);

        Ok(())
    }
}
