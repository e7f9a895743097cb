//! Switchboard - A configurable command and event dispatch engine for chat bots.
//!
//! Commands are declared in small configuration files instead of code: each
//! file names the keywords calling the command, the permissions it requires
//! and the identifier of the executor running it. The engine loads those
//! files, routes incoming messages and interactions to the right executor
//! after checking the member permissions, and fans every platform event out
//! to typed event handlers.
//!
//! # Architecture
//!
//! - [`bot`] - The dispatcher owning the command table and the event router
//! - [`commands`] - Command files, executors and the command table
//! - [`config`] - YAML configuration with environment overrides
//! - [`events`] - Inbound events and typed event handlers
//! - [`permissions`] - Guild permissions and the permission gate
//! - [`platform`] - Platform entities and the outbound sink
//! - [`transport`] - Transports feeding the bot, such as the console
//! - [`utils`] - Helpers shared by the other modules

pub mod bot;
pub mod commands;
pub mod config;
pub mod events;
pub mod permissions;
pub mod platform;
pub mod transport;
pub mod utils;
