//! Transports connecting the bot to a chat platform.
//!
//! A transport turns what the platform sends into [`Event`](crate::events::Event)s
//! handed to [`Bot::handle_event`](crate::bot::Bot::handle_event), and
//! implements [`Outbound`](crate::platform::Outbound) to deliver the answers.
//!
//! # Module Organization
//!
//! - [`console`] - Local transport reading standard input

pub mod console;

pub use crate::transport::console::{ConsoleOutbound, ConsoleTransport};
