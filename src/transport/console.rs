//! Console transport.
//!
//! Runs the bot against standard input, one line per event, and prints its
//! answers as Markdown on standard output. Useful to try command files
//! without connecting to a platform.
//!
//! # Line Format
//!
//! ```text
//! !ping                        text message
//! /poll question=lunch? d=5    interaction with options
//! :join bob                    bob joins the guild
//! :leave bob                   bob leaves the guild
//! :raw typing {"user": "bob"}  transport specific event
//! ```
//!
//! Every line is handled in its own task, so answers may be printed out of
//! order when executors take time.

use std::{
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::{JoinError, JoinSet},
};

use crate::{
    bot::Bot,
    commands::InteractionSpec,
    events::{Event, MemberJoined, MemberLeft, RawEvent, Ready, Shutdown},
    permissions::PermissionSet,
    platform::{
        Channel, Embed, Guild, Interaction, InteractionOption, Member, Message, Outbound, User,
    },
};

/// [`Outbound`] printing every answer to a writer.
pub struct ConsoleOutbound {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleOutbound {
    /// Creates an outbound printing to `out`.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        ConsoleOutbound {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Creates an outbound printing to standard output.
    pub fn stdout() -> Self {
        ConsoleOutbound::new(std::io::stdout())
    }

    fn print(&self, header: &str, embed: Option<&Embed>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let result = match embed {
            Some(embed) => writeln!(out, "{}\n{}\n", header, embed.to_markdown()),
            None => writeln!(out, "{}\n", header),
        };

        if let Err(e) = result.and_then(|_| out.flush()) {
            error!("failed to write to console: {}", e);
        }
    }
}

impl Outbound for ConsoleOutbound {
    fn reply_embed(&self, message: &Message, embed: &Embed) {
        self.print(&format!("> reply to @{}", message.author.name), Some(embed));
    }

    fn send_embed(&self, channel: &Channel, embed: &Embed) {
        self.print(&format!("> #{}", channel.name), Some(embed));
    }

    fn defer(&self, interaction: &Interaction) {
        debug!("interaction {} deferred", interaction.id);
    }

    fn send_followup(&self, interaction: &Interaction, embed: &Embed, ephemeral: bool) {
        let visibility = if ephemeral { " (only you can see this)" } else { "" };
        self.print(
            &format!("> /{} answered{}", interaction.name, visibility),
            Some(embed),
        );
    }

    fn register_interaction(&self, spec: &InteractionSpec) {
        let parameters = spec
            .parameters()
            .iter()
            .map(|parameter| {
                let optional = if parameter.required { "" } else { "?" };
                format!("{}{}:{}", parameter.name, optional, parameter.kind)
            })
            .collect::<Vec<_>>()
            .join(" ");
        info!("interaction /{} {} declared", spec.name(), parameters);
    }
}

/// Reads events from a line based input.
///
/// Every line is attributed to a single local member of a single guild.
pub struct ConsoleTransport {
    guild: Guild,
    channel: Channel,
    member: Member,
    bot_user: User,
}

impl ConsoleTransport {
    /// Creates a transport whose lines are sent by `user_name`, holding
    /// `permissions` in the console guild.
    pub fn new(user_name: &str, permissions: PermissionSet) -> Self {
        ConsoleTransport {
            guild: Guild {
                id: "console".to_owned(),
                name: "console".to_owned(),
            },
            channel: Channel {
                id: "stdin".to_owned(),
                name: "stdin".to_owned(),
            },
            member: Member {
                user: User {
                    id: "1".to_owned(),
                    name: user_name.to_owned(),
                    bot: false,
                },
                nickname: None,
                permissions,
            },
            bot_user: User {
                id: "0".to_owned(),
                name: env!("CARGO_PKG_NAME").to_owned(),
                bot: true,
            },
        }
    }

    /// Runs the bot against standard input until it is closed.
    pub async fn run(&self, bot: Arc<Bot>) -> anyhow::Result<()> {
        self.run_with(bot, BufReader::new(tokio::io::stdin()))
            .await
    }

    /// Runs the bot against `input` until it is exhausted.
    ///
    /// Emits [`Ready`] first, one task per line, then [`Shutdown`] once every
    /// line task is done.
    pub async fn run_with<R>(&self, bot: Arc<Bot>, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let ready = Event::Ready(Ready {
            user: self.bot_user.clone(),
            guild_count: 1,
        });
        bot.handle_event(&ready).await;

        let mut lines = input.lines();
        let mut tasks = JoinSet::new();
        let mut line_number = 0;
        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            let Some(event) = self.parse_line(line_number, &line) else {
                continue;
            };

            let bot = Arc::clone(&bot);
            tasks.spawn(async move {
                bot.handle_event(&event).await;
            });

            while let Some(result) = tasks.try_join_next() {
                log_task_result(result);
            }
        }

        while let Some(result) = tasks.join_next().await {
            log_task_result(result);
        }

        bot.handle_event(&Event::Shutdown(Shutdown)).await;
        Ok(())
    }

    /// Converts one input line into an event.
    ///
    /// `id` identifies the message or interaction. Returns `None` for blank
    /// and malformed lines.
    pub fn parse_line(&self, id: usize, line: &str) -> Option<Event> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        if let Some(rest) = line.strip_prefix('/') {
            return self.parse_interaction(id, rest);
        }
        if let Some(rest) = line.strip_prefix(':') {
            return self.parse_directive(rest);
        }

        Some(Event::MessageReceived(Message {
            id: id.to_string(),
            content: line.to_owned(),
            author: self.member.user.clone(),
            member: Some(self.member.clone()),
            guild: Some(self.guild.clone()),
            channel: self.channel.clone(),
        }))
    }

    fn parse_interaction(&self, id: usize, line: &str) -> Option<Event> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            warn!("ignoring interaction without name");
            return None;
        };

        let options = tokens
            .filter_map(|token| match token.split_once('=') {
                Some((name, value)) => Some(InteractionOption {
                    name: name.to_owned(),
                    value: value.to_owned(),
                }),
                None => {
                    warn!("ignoring option '{}': expected name=value", token);
                    None
                }
            })
            .collect();

        Some(Event::InteractionInvoked(Interaction {
            id: id.to_string(),
            name: name.to_owned(),
            user: self.member.user.clone(),
            member: Some(self.member.clone()),
            guild: Some(self.guild.clone()),
            channel: self.channel.clone(),
            options,
        }))
    }

    fn parse_directive(&self, line: &str) -> Option<Event> {
        let (directive, argument) = line.split_once(' ').unwrap_or((line, ""));
        let argument = argument.trim();

        match directive {
            "join" if !argument.is_empty() => Some(Event::MemberJoined(MemberJoined {
                guild: self.guild.clone(),
                member: Member {
                    user: self.local_user(argument),
                    nickname: None,
                    permissions: PermissionSet::new(),
                },
            })),
            "leave" if !argument.is_empty() => Some(Event::MemberLeft(MemberLeft {
                guild: self.guild.clone(),
                user: self.local_user(argument),
            })),
            "raw" if !argument.is_empty() => {
                let (name, payload) = argument.split_once(' ').unwrap_or((argument, "null"));
                match serde_json::from_str(payload) {
                    Ok(payload) => Some(Event::Raw(RawEvent {
                        name: name.to_owned(),
                        payload,
                    })),
                    Err(e) => {
                        warn!("ignoring raw event '{}': {}", name, e);
                        None
                    }
                }
            }
            _ => {
                warn!("unknown console directive ':{}'", line);
                None
            }
        }
    }

    fn local_user(&self, name: &str) -> User {
        User {
            id: format!("console-{}", name),
            name: name.to_owned(),
            bot: false,
        }
    }
}

fn log_task_result(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!("event task failed: {}", e);
    }
}
