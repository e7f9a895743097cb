//! Executor traits and the registry resolving executor identifiers.
//!
//! Command files reference their executor by a textual identifier such as
//! `"moderation::ban"`. The embedding application registers a factory for
//! each identifier before loading the command files; loading a file calls the
//! factory exactly once and binds the resulting executor to the spec.

use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use async_trait::async_trait;
use log::debug;

use crate::{
    bot::Bot,
    commands::{CommandInvocation, InteractionInvocation, LoadError},
    utils::panic_message,
};

/// Behaviour bound to a text command.
///
/// Executors are expected to be stateless: a fresh instance is created for
/// every spec on every load.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs the command.
    async fn execute(&self, bot: &Bot, invocation: &CommandInvocation) -> anyhow::Result<()>;
}

/// Behaviour bound to an interaction command.
#[async_trait]
pub trait InteractionExecutor: Send + Sync {
    /// Runs the interaction.
    async fn execute(
        &self,
        bot: &Bot,
        invocation: &InteractionInvocation,
    ) -> anyhow::Result<()>;
}

/// Builds one text command executor.
pub type CommandFactory =
    Box<dyn Fn() -> anyhow::Result<Arc<dyn CommandExecutor>> + Send + Sync>;

/// Builds one interaction executor.
pub type InteractionFactory =
    Box<dyn Fn() -> anyhow::Result<Arc<dyn InteractionExecutor>> + Send + Sync>;

/// Maps executor identifiers to executor factories.
///
/// # Examples
///
/// ```
/// # use std::sync::Arc;
/// # use async_trait::async_trait;
/// # use switchboard::{bot::Bot, commands::{CommandExecutor, CommandInvocation, ExecutorRegistry}};
/// #[derive(Default)]
/// struct Noop;
///
/// #[async_trait]
/// impl CommandExecutor for Noop {
///     async fn execute(&self, _bot: &Bot, _invocation: &CommandInvocation) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let mut registry = ExecutorRegistry::new();
/// registry.register_command_default::<Noop>("demo::noop");
/// assert!(registry.resolve_command("demo::noop").is_ok());
/// assert!(registry.resolve_command("demo::missing").is_err());
/// ```
#[derive(Default)]
pub struct ExecutorRegistry {
    commands: HashMap<String, CommandFactory>,
    interactions: HashMap<String, InteractionFactory>,
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ExecutorRegistry::default()
    }

    /// Registers a text command executor factory under `id`.
    ///
    /// A second registration for the same `id` replaces the first one.
    pub fn register_command<F>(&mut self, id: &str, factory: F)
    where
        F: Fn() -> anyhow::Result<Arc<dyn CommandExecutor>> + Send + Sync + 'static,
    {
        debug!("registering command executor '{}'", id);
        self.commands.insert(id.to_owned(), Box::new(factory));
    }

    /// Registers `T::default()` as the text command executor `id`.
    pub fn register_command_default<T>(&mut self, id: &str)
    where
        T: CommandExecutor + Default + 'static,
    {
        self.register_command(id, || Ok(Arc::new(T::default())));
    }

    /// Registers an interaction executor factory under `id`.
    pub fn register_interaction<F>(&mut self, id: &str, factory: F)
    where
        F: Fn() -> anyhow::Result<Arc<dyn InteractionExecutor>> + Send + Sync + 'static,
    {
        debug!("registering interaction executor '{}'", id);
        self.interactions.insert(id.to_owned(), Box::new(factory));
    }

    /// Registers `T::default()` as the interaction executor `id`.
    pub fn register_interaction_default<T>(&mut self, id: &str)
    where
        T: InteractionExecutor + Default + 'static,
    {
        self.register_interaction(id, || Ok(Arc::new(T::default())));
    }

    /// Instantiates the text command executor registered as `id`.
    ///
    /// # Errors
    ///
    /// - [`LoadError::UnknownExecutor`] when nothing is registered as `id`
    /// - [`LoadError::ExecutorConstruction`] when the factory fails or panics
    pub fn resolve_command(&self, id: &str) -> Result<Arc<dyn CommandExecutor>, LoadError> {
        instantiate(id, self.commands.get(id))
    }

    /// Instantiates the interaction executor registered as `id`.
    ///
    /// Fails the same way as [`Self::resolve_command`].
    pub fn resolve_interaction(
        &self,
        id: &str,
    ) -> Result<Arc<dyn InteractionExecutor>, LoadError> {
        instantiate(id, self.interactions.get(id))
    }
}

fn instantiate<T: ?Sized>(
    id: &str,
    factory: Option<&Box<dyn Fn() -> anyhow::Result<Arc<T>> + Send + Sync>>,
) -> Result<Arc<T>, LoadError> {
    let factory = factory.ok_or_else(|| LoadError::UnknownExecutor(id.to_owned()))?;

    match catch_unwind(AssertUnwindSafe(|| factory())) {
        Ok(Ok(executor)) => Ok(executor),
        Ok(Err(e)) => Err(LoadError::ExecutorConstruction {
            id: id.to_owned(),
            reason: format!("{:#}", e),
        }),
        Err(panic) => Err(LoadError::ExecutorConstruction {
            id: id.to_owned(),
            reason: panic_message(panic.as_ref()),
        }),
    }
}
