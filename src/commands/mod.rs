//! Declarative command definitions and their executors.
//!
//! Commands are not written in code: each one is a small configuration file
//! naming its description, the keywords calling it, the permissions it needs
//! and the identifier of its executor. Executors are registered in code in an
//! [`ExecutorRegistry`] and bound to the specs when the files are loaded.
//!
//! # Architecture
//!
//! ```text
//! commands/ping.toml ──┐
//! commands/ban.toml  ──┼── CommandTable::load_commands ──► CommandTable
//!        ...         ──┘            │                      keyword → CommandSpec
//!                                   ▼                      name    → InteractionSpec
//!                            ExecutorRegistry
//!                         "builtin::ping" → factory
//! ```
//!
//! Two families of commands exist:
//!
//! - **Text commands** ([`CommandSpec`]), invoked by a prefixed chat message
//!   such as `!ping`, bound to a [`CommandExecutor`]
//! - **Interactions** ([`InteractionSpec`]), structured commands declared to
//!   the platform with typed [`ParameterSpec`]s, bound to an
//!   [`InteractionExecutor`]
//!
//! # Command File Format
//!
//! ```toml
//! description = "Bans a member"
//! calls = ["ban", "b"]
//! permissions = ["BAN_MEMBERS"]
//! executor = "moderation::ban"
//! ```
//!
//! # Module Organization
//!
//! - [`actions`] - Built-in executors
//! - `document` - Raw configuration documents
//! - `executor` - Executor traits and registry
//! - `parameter` - Interaction parameters
//! - `parser` - Text command tokenization
//! - `spec` - Command and interaction specs
//! - `table` - The command table and its directory loader

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::{Channel, Guild, Interaction, Member, Message, User};

pub mod actions;
mod document;
mod executor;
mod parameter;
mod parser;
mod spec;
mod table;

pub use crate::commands::{
    executor::{
        CommandExecutor, CommandFactory, ExecutorRegistry, InteractionExecutor,
        InteractionFactory,
    },
    parameter::{ParameterSpec, ParameterType},
    parser::{Invocation, parse_invocation},
    spec::{CommandSpec, InteractionSpec},
    table::CommandTable,
};

/// Everything a [`CommandExecutor`] receives about one text command call.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    /// Guild where the command was called
    pub guild: Guild,
    /// Channel where the command was called
    pub channel: Channel,
    /// The message calling the command
    pub message: Message,
    /// Author of the message
    pub user: User,
    /// Author of the message as a guild member
    pub member: Member,
    /// Positional arguments following the keyword
    pub args: Vec<String>,
}

/// Everything an [`InteractionExecutor`] receives about one interaction.
#[derive(Debug, Clone)]
pub struct InteractionInvocation {
    /// Guild where the interaction was invoked
    pub guild: Guild,
    /// Channel where the interaction was invoked
    pub channel: Channel,
    /// Invoking account
    pub author: User,
    /// Invoking account as a guild member
    pub member: Member,
    /// The interaction event itself
    pub interaction: Interaction,
}

/// Errors raised while loading a command or interaction file.
///
/// A load error only discards the file it comes from, sibling files keep
/// loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path has no usable file name
    #[error("'{0}' has no valid file name")]
    InvalidFileName(PathBuf),
    /// Command names are file names and cannot contain spaces
    #[error("command name '{0}' cannot contain spaces")]
    NameWithSpaces(String),
    /// The document could not be read or does not match the expected format
    #[error("failed to read '{path}': {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },
    /// A text command must declare at least one call
    #[error("command '{0}' does not declare any call")]
    NoCalls(String),
    /// Parallel parameter arrays do not have the same length
    #[error("interaction '{name}': different options amount ({detail})")]
    ParameterCountMismatch { name: String, detail: String },
    /// A parameter type is not a known [`ParameterType`]
    #[error("interaction '{name}': parameter type '{kind}' does not exist")]
    UnknownParameterType { name: String, kind: String },
    /// Both parameter encodings are used in the same file
    #[error("interaction '{0}' declares parameters both as records and as arrays")]
    AmbiguousParameters(String),
    /// No factory is registered under the executor identifier
    #[error("no executor registered as '{0}'")]
    UnknownExecutor(String),
    /// The executor factory failed or panicked
    #[error("executor '{id}' cannot be instantiated: {reason}")]
    ExecutorConstruction { id: String, reason: String },
}
