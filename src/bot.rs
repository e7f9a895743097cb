//! The dispatcher tying commands, permissions and events together.
//!
//! A [`Bot`] owns the executor registry, the published [`CommandTable`] and
//! the [`EventRouter`]. Transports feed it [`Event`]s through
//! [`Bot::handle_event`]; the bot answers through the [`Outbound`] sink it was
//! built with.
//!
//! # Event Processing Flow
//!
//! ```text
//! MessageReceived    → prefix → keyword → guild/member → permissions → executor
//! InteractionInvoked → guild/member → name → permissions → executor
//! every event        → EventRouter fan-out
//! ```
//!
//! # Example
//!
//! ```no_run
//! # use std::{path::Path, sync::Arc};
//! # use switchboard::{bot::Bot, commands::{ExecutorRegistry, actions}, platform::Outbound};
//! # fn example(outbound: Arc<dyn Outbound>) {
//! let mut registry = ExecutorRegistry::new();
//! actions::register_builtins(&mut registry);
//!
//! let mut bot = Bot::new("!", outbound, registry);
//! bot.register_commands(Path::new("commands"), true);
//! bot.register_interactions(Path::new("interactions"), true);
//! let bot = Arc::new(bot);
//! # }
//! ```

use std::{
    future::Future,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::{
    runtime::{Handle, RuntimeFlavor},
    task::block_in_place,
};

use crate::{
    commands::{
        CommandInvocation, CommandTable, ExecutorRegistry, InteractionInvocation,
        parse_invocation,
    },
    events::{Event, EventHandler, EventPayload, EventRouter},
    permissions::PermissionGate,
    platform::{DefaultEmbeds, Interaction, Message, Outbound},
    utils::panic_message,
};

/// A directory the command table is built from.
#[derive(Debug, Clone)]
enum TableSource {
    Commands { root: PathBuf, recurse: bool },
    Interactions { root: PathBuf, recurse: bool },
}

/// The dispatch engine.
///
/// Configured mutably at start-up (registering directories and event
/// handlers), then shared as `Arc<Bot>` between the tasks handling events.
///
/// # Thread Safety
///
/// The command table is published as an `Arc` snapshot behind a lock held
/// only to clone or swap it. A dispatch keeps the snapshot it started with
/// even if [`Bot::reload`] publishes a new table meanwhile.
pub struct Bot {
    /// Prefix of text commands, e.g. `!`
    prefix: String,
    /// Sink towards the chat platform
    outbound: Arc<dyn Outbound>,
    /// Embeds sent when a command is refused or not handled
    embeds: DefaultEmbeds,
    /// Executor factories, kept to rebuild the table on reload
    registry: ExecutorRegistry,
    /// Handlers receiving every inbound event
    router: EventRouter,
    /// Currently published command table
    table: RwLock<Arc<CommandTable>>,
    /// Directories registered so far, in registration order
    sources: Vec<TableSource>,
}

impl Bot {
    /// Creates a bot with an empty command table.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix of text commands
    /// * `outbound` - Sink used to answer users and declare interactions
    /// * `registry` - Executor factories referenced by command files
    pub fn new(prefix: &str, outbound: Arc<dyn Outbound>, registry: ExecutorRegistry) -> Self {
        Bot {
            prefix: prefix.to_owned(),
            outbound,
            embeds: DefaultEmbeds::default(),
            registry,
            router: EventRouter::new(),
            table: RwLock::new(Arc::new(CommandTable::new())),
            sources: vec![],
        }
    }

    /// Replaces the default embeds.
    pub fn with_embeds(mut self, embeds: DefaultEmbeds) -> Self {
        self.embeds = embeds;
        self
    }

    /// Bot with a mock outbound and no command, for tests.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Bot::new(
            "!",
            Arc::new(crate::platform::MockOutbound::new()),
            ExecutorRegistry::new(),
        )
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sink towards the chat platform, for executors and handlers.
    pub fn outbound(&self) -> &dyn Outbound {
        self.outbound.as_ref()
    }

    pub fn embeds(&self) -> &DefaultEmbeds {
        &self.embeds
    }

    /// Returns a snapshot of the published command table.
    pub fn table(&self) -> Arc<CommandTable> {
        Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Appends an event handler to the router.
    pub fn register_event_handler<E, H>(&mut self, handler: H)
    where
        E: EventPayload,
        H: EventHandler<E> + 'static,
    {
        self.router.register(handler);
    }

    /// Loads the text commands found under `root` into the table.
    ///
    /// `root` is remembered and read again on every [`Bot::reload`].
    ///
    /// # Returns
    ///
    /// The number of commands loaded.
    pub fn register_commands(&mut self, root: &Path, recurse: bool) -> usize {
        let source = TableSource::Commands {
            root: root.to_path_buf(),
            recurse,
        };
        self.register_source(source)
    }

    /// Loads the interactions found under `root` into the table and declares
    /// them to the platform.
    ///
    /// `root` is remembered and read again on every [`Bot::reload`].
    pub fn register_interactions(&mut self, root: &Path, recurse: bool) -> usize {
        let source = TableSource::Interactions {
            root: root.to_path_buf(),
            recurse,
        };
        self.register_source(source)
    }

    fn register_source(&mut self, source: TableSource) -> usize {
        let mut loaded = CommandTable::new();
        let count = self.load_source(&mut loaded, &source);
        self.announce(&loaded);

        let table = self
            .table
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(table).merge(loaded);
        self.sources.push(source);

        count
    }

    fn load_source(&self, table: &mut CommandTable, source: &TableSource) -> usize {
        match source {
            TableSource::Commands { root, recurse } => {
                let count = table.load_commands(root, *recurse, &self.registry);
                info!("{} command(s) loaded from '{}'", count, root.display());
                count
            }
            TableSource::Interactions { root, recurse } => {
                let count = table.load_interactions(root, *recurse, &self.registry);
                info!("{} interaction(s) loaded from '{}'", count, root.display());
                count
            }
        }
    }

    /// Declares every interaction of `table` to the platform.
    fn announce(&self, table: &CommandTable) {
        for spec in table.interactions() {
            debug!("declaring interaction '{}'", spec.name());
            self.outbound.register_interaction(&spec);
        }
    }

    /// Rebuilds the command table from every registered directory and
    /// publishes it.
    ///
    /// Executors are instantiated again. Dispatches already running keep the
    /// previous table.
    ///
    /// # Returns
    ///
    /// The number of commands and interactions loaded.
    /// The directory walk runs through [`block_in_place`] when called from a
    /// multi-threaded runtime, so the other tasks of the worker keep running.
    pub fn reload(&self) -> usize {
        info!("reloading commands from {} source(s)", self.sources.len());

        let multi_thread = Handle::try_current()
            .is_ok_and(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread);
        let (table, count) = if multi_thread {
            block_in_place(|| self.rebuild_table())
        } else {
            self.rebuild_table()
        };
        self.announce(&table);

        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
        info!("reload done, {} file(s) loaded", count);

        count
    }

    fn rebuild_table(&self) -> (CommandTable, usize) {
        let mut table = CommandTable::new();
        let count = self
            .sources
            .iter()
            .map(|source| self.load_source(&mut table, source))
            .sum();
        (table, count)
    }

    /// Handles one inbound event.
    ///
    /// Messages and interactions go through their command path first. Every
    /// event is then fanned out to the registered event handlers. Executor
    /// and handler failures are logged, never propagated.
    pub async fn handle_event(&self, event: &Event) {
        match event {
            Event::Ready(ready) => info!(
                "bot is ready as '{}' in {} guild(s)",
                ready.user.name, ready.guild_count
            ),
            Event::MessageReceived(message) => self.on_message(message).await,
            Event::InteractionInvoked(interaction) => self.on_interaction(interaction).await,
            Event::Shutdown(_) => info!("transport is shutting down"),
            _ => {}
        }

        debug!("event: {}", event.kind());
        self.router.dispatch(self, event).await;
    }

    async fn on_message(&self, message: &Message) {
        if message.author.bot {
            return;
        }

        let Some(invocation) = parse_invocation(&self.prefix, &message.content) else {
            return;
        };

        let table = self.table();
        let Some(spec) = table.command(&invocation.keyword) else {
            debug!("no command is called '{}'", invocation.keyword);
            return;
        };

        let (Some(guild), Some(member)) = (&message.guild, &message.member) else {
            debug!(
                "ignoring command '{}' sent outside of a guild by @{}",
                spec.name(),
                message.author.name
            );
            return;
        };

        if !PermissionGate::allowed(member, spec.permissions()) {
            info!(
                "@{} ({}) tried to call command '{}' on ({}#{}) -> refused : missing permission(s)",
                message.author.name,
                member.display_name(),
                spec.name(),
                guild.name,
                message.channel.name
            );
            self.outbound
                .reply_embed(message, &self.embeds.no_permission);
            return;
        }

        let Some(executor) = spec.executor() else {
            warn!(
                "@{} called command '{}' on ({}#{}) but it has no executor",
                message.author.name,
                spec.name(),
                guild.name,
                message.channel.name
            );
            self.outbound
                .reply_embed(message, &self.embeds.missing_executor);
            return;
        };

        let invocation = CommandInvocation {
            guild: guild.clone(),
            channel: message.channel.clone(),
            message: message.clone(),
            user: message.author.clone(),
            member: member.clone(),
            args: invocation.args,
        };

        debug!(
            "@{} calls command '{}' with {:?}",
            message.author.name,
            spec.name(),
            invocation.args
        );
        run_guarded("command", spec.name(), executor.execute(self, &invocation)).await;
    }

    async fn on_interaction(&self, interaction: &Interaction) {
        let Some(guild) = &interaction.guild else {
            debug!("ignoring interaction '{}' outside of a guild", interaction.name);
            return;
        };
        let Some(member) = &interaction.member else {
            debug!("ignoring interaction '{}' without member", interaction.name);
            return;
        };

        let table = self.table();
        let Some(spec) = table.interaction(&interaction.name) else {
            warn!(
                "@{} invoked unknown interaction '{}' on ({}#{})",
                interaction.user.name, interaction.name, guild.name, interaction.channel.name
            );
            self.answer_missing_executor(interaction);
            return;
        };

        if !PermissionGate::allowed(member, spec.permissions()) {
            info!(
                "@{} ({}) tried to invoke interaction '{}' on ({}#{}) -> refused : missing permission(s)",
                interaction.user.name,
                member.display_name(),
                spec.name(),
                guild.name,
                interaction.channel.name
            );
            self.outbound.defer(interaction);
            self.outbound
                .send_followup(interaction, &self.embeds.no_permission, true);
            return;
        }

        let Some(executor) = spec.executor() else {
            warn!(
                "@{} invoked interaction '{}' on ({}#{}) but it has no executor",
                interaction.user.name,
                spec.name(),
                guild.name,
                interaction.channel.name
            );
            self.answer_missing_executor(interaction);
            return;
        };

        let invocation = InteractionInvocation {
            guild: guild.clone(),
            channel: interaction.channel.clone(),
            author: interaction.user.clone(),
            member: member.clone(),
            interaction: interaction.clone(),
        };

        run_guarded(
            "interaction",
            spec.name(),
            executor.execute(self, &invocation),
        )
        .await;
    }

    fn answer_missing_executor(&self, interaction: &Interaction) {
        self.outbound.defer(interaction);
        self.outbound
            .send_followup(interaction, &self.embeds.missing_executor, true);
    }
}

/// Awaits an executor, logging its error or panic.
async fn run_guarded<F>(kind: &str, name: &str, execution: F)
where
    F: Future<Output = anyhow::Result<()>>,
{
    match AssertUnwindSafe(execution).catch_unwind().await {
        Ok(Ok(())) => debug!("{} '{}' executed", kind, name),
        Ok(Err(e)) => error!("{} '{}' failed: {:#}", kind, name, e),
        Err(panic) => error!(
            "{} '{}' panicked: {}",
            kind,
            name,
            panic_message(panic.as_ref())
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        commands::{CommandExecutor, InteractionExecutor},
        permissions::{Permission, PermissionSet},
        platform::{Channel, Guild, InteractionOption, Member, MockOutbound, User},
    };

    type Calls = Arc<Mutex<Vec<Vec<String>>>>;

    struct Recorder(Calls);

    #[async_trait]
    impl CommandExecutor for Recorder {
        async fn execute(&self, _bot: &Bot, invocation: &CommandInvocation) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(invocation.args.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl InteractionExecutor for Recorder {
        async fn execute(
            &self,
            _bot: &Bot,
            invocation: &InteractionInvocation,
        ) -> anyhow::Result<()> {
            let values = invocation
                .interaction
                .options
                .iter()
                .map(|option| option.value.clone())
                .collect();
            self.0.lock().unwrap().push(values);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Panicking;

    #[async_trait]
    impl CommandExecutor for Panicking {
        async fn execute(&self, _bot: &Bot, _invocation: &CommandInvocation) -> anyhow::Result<()> {
            panic!("executor bug")
        }
    }

    #[derive(Default)]
    struct Failing;

    #[async_trait]
    impl CommandExecutor for Failing {
        async fn execute(&self, _bot: &Bot, _invocation: &CommandInvocation) -> anyhow::Result<()> {
            anyhow::bail!("upstream unavailable")
        }
    }

    struct MessageCounter(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler<Message> for MessageCounter {
        async fn handle(&self, _bot: &Bot, _event: &Message) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn create_registry(calls: &Calls) -> ExecutorRegistry {
        let mut registry = ExecutorRegistry::new();
        let command_calls = Arc::clone(calls);
        registry.register_command("test::record", move || {
            Ok(Arc::new(Recorder(Arc::clone(&command_calls))))
        });
        let interaction_calls = Arc::clone(calls);
        registry.register_interaction("test::record", move || {
            Ok(Arc::new(Recorder(Arc::clone(&interaction_calls))))
        });
        registry.register_command_default::<Panicking>("test::panic");
        registry.register_command_default::<Failing>("test::fail");
        registry
    }

    fn create_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let commands = dir.path().join("commands");
        fs::create_dir(&commands).unwrap();
        let files = [
            ("foo", "calls = [\"foo\", \"f\"]\nexecutor = \"test::record\"\n"),
            (
                "ban",
                "calls = [\"ban\"]\npermissions = [\"BAN_MEMBERS\"]\nexecutor = \"test::record\"\n",
            ),
            ("orphan", "calls = [\"orphan\"]\nexecutor = \"test::missing\"\n"),
            ("crash", "calls = [\"crash\"]\nexecutor = \"test::panic\"\n"),
            ("fail", "calls = [\"fail\"]\nexecutor = \"test::fail\"\n"),
        ];
        for (name, body) in files {
            fs::write(
                commands.join(format!("{}.toml", name)),
                format!("description = \"{} command\"\n{}", name, body),
            )
            .unwrap();
        }

        let interactions = dir.path().join("interactions");
        fs::create_dir(&interactions).unwrap();
        let files = [
            ("poll", "permissions = []\nexecutor = \"test::record\"\n"),
            (
                "purge",
                "permissions = [\"MESSAGE_MANAGE\"]\nexecutor = \"test::record\"\n",
            ),
            ("orphan", "permissions = []\nexecutor = \"test::missing\"\n"),
        ];
        for (name, body) in files {
            fs::write(
                interactions.join(format!("{}.toml", name)),
                format!("description = \"{} interaction\"\n{}", name, body),
            )
            .unwrap();
        }

        dir
    }

    /// Builds a bot over `create_tree`, letting `outbound` accept the
    /// interaction declarations made while loading.
    fn create_bot(mut outbound: MockOutbound, calls: &Calls, dir: &TempDir) -> Bot {
        outbound.expect_register_interaction().return_const(());
        let mut bot = Bot::new("!", Arc::new(outbound), create_registry(calls));
        bot.register_commands(&dir.path().join("commands"), false);
        bot.register_interactions(&dir.path().join("interactions"), false);
        bot
    }

    fn create_test_member(permissions: &[Permission]) -> Member {
        Member {
            user: create_test_user(false),
            nickname: Some("Ally".to_string()),
            permissions: permissions.iter().copied().collect::<PermissionSet>(),
        }
    }

    fn create_test_user(bot: bool) -> User {
        User {
            id: "1".to_string(),
            name: "alice".to_string(),
            bot,
        }
    }

    fn create_test_message(content: &str, permissions: &[Permission]) -> Message {
        Message {
            id: "m1".to_string(),
            content: content.to_string(),
            author: create_test_user(false),
            member: Some(create_test_member(permissions)),
            guild: Some(Guild {
                id: "g1".to_string(),
                name: "guild".to_string(),
            }),
            channel: Channel {
                id: "c1".to_string(),
                name: "general".to_string(),
            },
        }
    }

    fn create_test_interaction(name: &str, permissions: &[Permission]) -> Interaction {
        Interaction {
            id: "i1".to_string(),
            name: name.to_string(),
            user: create_test_user(false),
            member: Some(create_test_member(permissions)),
            guild: Some(Guild {
                id: "g1".to_string(),
                name: "guild".to_string(),
            }),
            channel: Channel {
                id: "c1".to_string(),
                name: "general".to_string(),
            },
            options: vec![InteractionOption {
                name: "question".to_string(),
                value: "lunch?".to_string(),
            }],
        }
    }

    fn first_field(embed: &crate::platform::Embed) -> &str {
        &embed.fields[0].name
    }

    #[tokio::test]
    async fn test_text_command_receives_collapsed_args() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let message = create_test_message("!foo   bar  baz", &[]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert_eq!(*calls.lock().unwrap(), vec![vec!["bar", "baz"]]);
    }

    #[tokio::test]
    async fn test_text_command_alias() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let message = create_test_message("!f", &[]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_message_without_prefix_is_ignored() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let message = create_test_message("foo bar", &[]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bot_author_is_ignored() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let mut message = create_test_message("!foo", &[]);
        message.author.bot = true;
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_keyword_is_silent() {
        let dir = create_tree();
        let calls = Calls::default();
        // No expectation: any outbound call fails the test
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let message = create_test_message("!nope", &[]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_direct_message_is_ignored() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let mut message = create_test_message("!foo", &[]);
        message.guild = None;
        bot.handle_event(&Event::MessageReceived(message)).await;

        let mut message = create_test_message("!foo", &[]);
        message.member = None;
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_command_denied_without_permission() {
        let dir = create_tree();
        let calls = Calls::default();
        let mut outbound = MockOutbound::new();
        outbound
            .expect_reply_embed()
            .withf(|_, embed| first_field(embed) == "Permission refused")
            .times(1)
            .return_const(());
        let bot = create_bot(outbound, &calls, &dir);

        let message = create_test_message("!ban bob", &[Permission::KickMembers]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_command_allowed_with_permission() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let message = create_test_message("!ban bob", &[Permission::BanMembers]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert_eq!(*calls.lock().unwrap(), vec![vec!["bob"]]);
    }

    #[tokio::test]
    async fn test_administrator_passes_every_check() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let message = create_test_message("!ban bob", &[Permission::Administrator]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_text_command_without_executor() {
        let dir = create_tree();
        let calls = Calls::default();
        let mut outbound = MockOutbound::new();
        outbound
            .expect_reply_embed()
            .withf(|_, embed| first_field(embed) == "No executor")
            .times(1)
            .return_const(());
        let bot = create_bot(outbound, &calls, &dir);

        let message = create_test_message("!orphan", &[]);
        bot.handle_event(&Event::MessageReceived(message)).await;

        assert!(bot.table().command("orphan").is_some());
    }

    #[tokio::test]
    async fn test_executor_faults_are_contained() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        bot.handle_event(&Event::MessageReceived(create_test_message("!crash", &[])))
            .await;
        bot.handle_event(&Event::MessageReceived(create_test_message("!fail", &[])))
            .await;
        bot.handle_event(&Event::MessageReceived(create_test_message("!foo ok", &[])))
            .await;

        assert_eq!(*calls.lock().unwrap(), vec![vec!["ok"]]);
    }

    #[tokio::test]
    async fn test_interaction_executed() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let interaction = create_test_interaction("poll", &[]);
        bot.handle_event(&Event::InteractionInvoked(interaction)).await;

        assert_eq!(*calls.lock().unwrap(), vec![vec!["lunch?"]]);
    }

    #[tokio::test]
    async fn test_interaction_denied_is_ephemeral() {
        let dir = create_tree();
        let calls = Calls::default();
        let mut outbound = MockOutbound::new();
        outbound.expect_defer().times(1).return_const(());
        outbound
            .expect_send_followup()
            .withf(|_, embed, ephemeral| *ephemeral && first_field(embed) == "Permission refused")
            .times(1)
            .return_const(());
        let bot = create_bot(outbound, &calls, &dir);

        let interaction = create_test_interaction("purge", &[]);
        bot.handle_event(&Event::InteractionInvoked(interaction)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_interaction_answers_missing_executor() {
        let dir = create_tree();
        let calls = Calls::default();
        let mut outbound = MockOutbound::new();
        outbound.expect_defer().times(2).return_const(());
        outbound
            .expect_send_followup()
            .withf(|_, embed, ephemeral| *ephemeral && first_field(embed) == "No executor")
            .times(2)
            .return_const(());
        let bot = create_bot(outbound, &calls, &dir);

        for name in ["unknown", "orphan"] {
            let interaction = create_test_interaction(name, &[Permission::Administrator]);
            bot.handle_event(&Event::InteractionInvoked(interaction)).await;
        }

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interaction_permissions_checked_before_executor() {
        let dir = create_tree();
        fs::write(
            dir.path().join("interactions").join("lock.toml"),
            "description = \"lock\"\npermissions = [\"ADMINISTRATOR\"]\nexecutor = \"test::missing\"\n",
        )
        .unwrap();
        let calls = Calls::default();
        let mut outbound = MockOutbound::new();
        outbound.expect_defer().times(2).return_const(());
        outbound
            .expect_send_followup()
            .withf(|_, embed, ephemeral| *ephemeral && first_field(embed) == "Permission refused")
            .times(1)
            .return_const(());
        outbound
            .expect_send_followup()
            .withf(|_, embed, ephemeral| *ephemeral && first_field(embed) == "No executor")
            .times(1)
            .return_const(());
        let bot = create_bot(outbound, &calls, &dir);

        let interaction = create_test_interaction("lock", &[]);
        bot.handle_event(&Event::InteractionInvoked(interaction)).await;
        let interaction = create_test_interaction("lock", &[Permission::Administrator]);
        bot.handle_event(&Event::InteractionInvoked(interaction)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interaction_outside_guild_is_ignored() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let mut interaction = create_test_interaction("poll", &[]);
        interaction.guild = None;
        bot.handle_event(&Event::InteractionInvoked(interaction)).await;

        let mut interaction = create_test_interaction("unknown", &[]);
        interaction.member = None;
        bot.handle_event(&Event::InteractionInvoked(interaction)).await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interactions_are_declared_on_load() {
        let dir = create_tree();
        let mut outbound = MockOutbound::new();
        outbound
            .expect_register_interaction()
            .times(3)
            .return_const(());
        let mut bot = Bot::new("!", Arc::new(outbound), ExecutorRegistry::new());

        let loaded = bot.register_interactions(&dir.path().join("interactions"), false);

        assert_eq!(loaded, 3);
    }

    #[tokio::test]
    async fn test_every_event_is_fanned_out() {
        let dir = create_tree();
        let calls = Calls::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bot = create_bot(MockOutbound::new(), &calls, &dir);
        bot.register_event_handler(MessageCounter(Arc::clone(&counter)));

        bot.handle_event(&Event::MessageReceived(create_test_message("!foo", &[])))
            .await;
        bot.handle_event(&Event::MessageReceived(create_test_message("hello", &[])))
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_publishes_new_table() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);
        let before = bot.table();

        fs::write(
            dir.path().join("commands").join("added.toml"),
            "description = \"added\"\ncalls = [\"added\"]\nexecutor = \"test::record\"\n",
        )
        .unwrap();
        fs::remove_file(dir.path().join("commands").join("foo.toml")).unwrap();
        let loaded = bot.reload();

        let after = bot.table();
        assert_eq!(loaded, 8);
        assert!(before.command("foo").is_some());
        assert!(before.command("added").is_none());
        assert!(after.command("foo").is_none());
        assert!(after.command("added").is_some());
        assert!(after.interaction("poll").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reload_from_multi_thread_runtime() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = Arc::new(create_bot(MockOutbound::new(), &calls, &dir));

        let task_bot = Arc::clone(&bot);
        let loaded = tokio::spawn(async move { task_bot.reload() }).await.unwrap();

        assert_eq!(loaded, 8);
        assert!(bot.table().command("foo").is_some());
    }

    #[tokio::test]
    async fn test_same_snapshot_during_dispatch() {
        let dir = create_tree();
        let calls = Calls::default();
        let bot = create_bot(MockOutbound::new(), &calls, &dir);

        let first = bot.table();
        let second = bot.table();

        assert!(Arc::ptr_eq(&first, &second));
        bot.reload();
        assert!(!Arc::ptr_eq(&first, &bot.table()));
    }
}
