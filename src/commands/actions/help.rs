//! Help command executor.
//!
//! Lists the text commands of the current table the calling member is
//! allowed to use, with their calls and description.

use async_trait::async_trait;
use log::debug;

use crate::{
    bot::Bot,
    commands::{CommandExecutor, CommandInvocation, CommandSpec},
    permissions::PermissionGate,
    platform::{Embed, INFO_COLOR},
};

/// Formats the calls of `spec` as `` `!ping` | `!p` ``.
fn format_calls(prefix: &str, spec: &CommandSpec) -> String {
    spec.calls()
        .iter()
        .map(|call| format!("`{}{}`", prefix, call))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Replies with the list of usable commands.
#[derive(Debug, Default)]
pub struct HelpExecutor;

#[async_trait]
impl CommandExecutor for HelpExecutor {
    async fn execute(&self, bot: &Bot, invocation: &CommandInvocation) -> anyhow::Result<()> {
        debug!("handling help command");

        let table = bot.table();
        let embed = table
            .commands()
            .iter()
            .filter(|spec| PermissionGate::allowed(&invocation.member, spec.permissions()))
            .fold(Embed::new(INFO_COLOR).title("Commands"), |embed, spec| {
                embed.field(
                    &format_calls(bot.prefix(), spec),
                    spec.description(),
                    false,
                )
            });

        bot.outbound().reply_embed(&invocation.message, &embed);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc};

    use tempfile::TempDir;

    use super::*;
    use crate::{
        commands::{
            ExecutorRegistry,
            actions::{fixtures::create_test_invocation, register_builtins},
        },
        permissions::Permission,
        platform::MockOutbound,
    };

    fn create_commands() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ping.toml"),
            "description = \"Checks the bot\"\ncalls = [\"ping\", \"p\"]\nexecutor = \"builtin::ping\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("reload.toml"),
            "description = \"Reloads commands\"\ncalls = [\"reload\"]\npermissions = [\"ADMINISTRATOR\"]\nexecutor = \"builtin::reload\"\n",
        )
        .unwrap();
        dir
    }

    fn create_bot(outbound: MockOutbound, dir: &TempDir) -> Bot {
        let mut registry = ExecutorRegistry::new();
        register_builtins(&mut registry);
        let mut bot = Bot::new("!", Arc::new(outbound), registry);
        bot.register_commands(dir.path(), false);
        bot
    }

    #[tokio::test]
    async fn test_help_hides_forbidden_commands() {
        let dir = create_commands();
        let mut outbound = MockOutbound::new();
        outbound
            .expect_reply_embed()
            .withf(|_, embed| {
                embed.fields.len() == 1
                    && embed.fields[0].name == "`!ping` | `!p`"
                    && embed.fields[0].value == "Checks the bot"
            })
            .times(1)
            .return_const(());
        let bot = create_bot(outbound, &dir);

        let result = HelpExecutor
            .execute(&bot, &create_test_invocation(&[], &[]))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_help_lists_everything_for_administrators() {
        let dir = create_commands();
        let mut outbound = MockOutbound::new();
        outbound
            .expect_reply_embed()
            .withf(|_, embed| embed.fields.len() == 2 && embed.fields[1].name == "`!reload`")
            .times(1)
            .return_const(());
        let bot = create_bot(outbound, &dir);

        let invocation = create_test_invocation(&[], &[Permission::Administrator]);
        let result = HelpExecutor.execute(&bot, &invocation).await;

        assert!(result.is_ok());
    }
}
