//! Ping executors, answering `Pong!` to check the bot is alive.

use async_trait::async_trait;
use log::debug;

use crate::{
    bot::Bot,
    commands::{CommandExecutor, CommandInvocation, InteractionExecutor, InteractionInvocation},
    platform::{Embed, INFO_COLOR},
};

fn pong() -> Embed {
    Embed::new(INFO_COLOR).field("Pong!", "The bot is up and running.", false)
}

/// Replies `Pong!` to the calling message.
#[derive(Debug, Default)]
pub struct PingExecutor;

#[async_trait]
impl CommandExecutor for PingExecutor {
    async fn execute(&self, bot: &Bot, invocation: &CommandInvocation) -> anyhow::Result<()> {
        debug!("handling ping command");
        bot.outbound().reply_embed(&invocation.message, &pong());
        Ok(())
    }
}

/// Answers `Pong!` to the interaction.
#[derive(Debug, Default)]
pub struct PingInteraction;

#[async_trait]
impl InteractionExecutor for PingInteraction {
    async fn execute(&self, bot: &Bot, invocation: &InteractionInvocation) -> anyhow::Result<()> {
        debug!("handling ping interaction");
        bot.outbound().defer(&invocation.interaction);
        bot.outbound()
            .send_followup(&invocation.interaction, &pong(), false);
        Ok(())
    }
}
