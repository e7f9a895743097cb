//! Built-in executors.
//!
//! Executors shipped with the bot, referenced from command files by their
//! `builtin::` identifier.
//!
//! # Available Executors
//!
//! | Identifier          | Kind        | Executor                |
//! |---------------------|-------------|-------------------------|
//! | `builtin::help`     | command     | [`HelpExecutor`]        |
//! | `builtin::ping`     | command     | [`PingExecutor`]        |
//! | `builtin::echo`     | command     | [`EchoExecutor`]        |
//! | `builtin::reload`   | command     | [`ReloadExecutor`]      |
//! | `builtin::ping`     | interaction | [`PingInteraction`]     |

mod echo;
mod help;
mod ping;
mod reload;

pub use crate::commands::actions::{
    echo::EchoExecutor,
    help::HelpExecutor,
    ping::{PingExecutor, PingInteraction},
    reload::ReloadExecutor,
};
use crate::commands::ExecutorRegistry;

/// Registers every built-in executor into `registry`.
pub fn register_builtins(registry: &mut ExecutorRegistry) {
    registry.register_command_default::<HelpExecutor>("builtin::help");
    registry.register_command_default::<PingExecutor>("builtin::ping");
    registry.register_command_default::<EchoExecutor>("builtin::echo");
    registry.register_command_default::<ReloadExecutor>("builtin::reload");
    registry.register_interaction_default::<PingInteraction>("builtin::ping");
}
