//! Configuration file structures for the bot.
//!
//! The configuration is a YAML file with a single `bot` section. Every value
//! can be overridden by an environment variable prefixed with `SWITCHBOARD_`,
//! nested keys being separated by `__`.
//!
//! # Configuration File Format
//!
//! ```yaml
//! bot:
//!   # Secret token of the bot account
//!   token: "your-token"
//!   # Gateway intents, unknown ones are skipped
//!   intents: ["GUILDS", "GUILD_MESSAGES", "MESSAGE_CONTENT"]
//!   # ONLINE, IDLE, DO_NOT_DISTURB, INVISIBLE or OFFLINE
//!   status: "ONLINE"
//!   # "<TYPE> <text>", TYPE being PLAYING, STREAMING, LISTENING, WATCHING or COMPETING
//!   activity: "PLAYING with commands"
//!   # Prefix of text commands
//!   prefix: "!"
//! ```
//!
//! # Environment Variable Overrides
//!
//! ```bash
//! export SWITCHBOARD_BOT__TOKEN="secret-from-env"
//! export SWITCHBOARD_BOT__PREFIX="?"
//! ```

use std::{fmt, fs, path::Path, str::FromStr};

use anyhow::{Context, anyhow};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use log::{error, info, warn};
use serde::Deserialize;

/// Configuration written when none exists yet.
pub const DEFAULT_CONFIG: &str = include_str!("../assets/default_config.yaml");

/// Root configuration structure.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Bot account settings
    pub bot: BotSettings,
}

/// Settings of the bot account.
#[derive(Debug, Deserialize)]
pub struct BotSettings {
    /// Secret token of the bot account.
    pub token: String,

    /// Gateway intent names, see [`BotSettings::gateway_intents`].
    #[serde(default)]
    pub intents: Vec<String>,

    /// Presence status name, `ONLINE` when absent or empty.
    pub status: Option<String>,

    /// Activity shown under the bot name, as `"<TYPE> <text>"`.
    pub activity: Option<String>,

    /// Prefix of text commands.
    pub prefix: String,
}

impl Config {
    /// Loads the configuration from the YAML file at `path`, then applies the
    /// `SWITCHBOARD_` environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or malformed, when a required value is
    /// absent, or when the prefix is empty or contains whitespace.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            anyhow::bail!("'{}' does not exist", path.display());
        }

        let config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SWITCHBOARD_").split("__"))
            .extract()
            .with_context(|| format!("failed to load '{}'", path.display()))?;

        if config.bot.prefix.is_empty() {
            anyhow::bail!("'bot.prefix' cannot be empty");
        }
        if config.bot.prefix.contains(char::is_whitespace) {
            anyhow::bail!(
                "'bot.prefix' cannot contain whitespace, got '{}'",
                config.bot.prefix
            );
        }

        Ok(config)
    }

    /// Writes [`DEFAULT_CONFIG`] at `path` unless a file already exists there.
    ///
    /// # Returns
    ///
    /// `true` when the default configuration was written.
    pub fn write_default(path: &Path) -> anyhow::Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create '{}'", parent.display()))?;
        }
        fs::write(path, DEFAULT_CONFIG)
            .with_context(|| format!("failed to write '{}'", path.display()))?;

        info!("default configuration written to '{}'", path.display());
        Ok(true)
    }
}

impl BotSettings {
    /// Returns the configured intents.
    ///
    /// Names are upper-cased; unknown ones are logged and skipped.
    pub fn gateway_intents(&self) -> Vec<GatewayIntent> {
        self.intents
            .iter()
            .filter_map(|name| match name.parse::<GatewayIntent>() {
                Ok(intent) => Some(intent),
                Err(_) => {
                    error!(
                        "unable to enable intent '{}': intent does not exist",
                        name.to_uppercase()
                    );
                    None
                }
            })
            .collect()
    }

    /// Returns the configured status, [`Status::Online`] when not set.
    pub fn status(&self) -> anyhow::Result<Status> {
        match self.status.as_deref().filter(|status| !status.is_empty()) {
            Some(status) => {
                let status = status.parse::<Status>()?;
                info!("status set to {}", status);
                Ok(status)
            }
            None => {
                warn!("bot status not set, using default {} status", Status::Online);
                Ok(Status::Online)
            }
        }
    }

    /// Returns the configured activity, if any.
    pub fn activity(&self) -> anyhow::Result<Option<Activity>> {
        match self.activity.as_deref().filter(|activity| !activity.is_empty()) {
            Some(activity) => {
                let activity = activity.parse::<Activity>()?;
                info!("activity set to {}", activity);
                Ok(Some(activity))
            }
            None => {
                warn!("bot activity not set, using no activity");
                Ok(None)
            }
        }
    }
}

/// Presence status of the bot account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Online,
    Idle,
    DoNotDisturb,
    Invisible,
    Offline,
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_uppercase().as_str() {
            "ONLINE" => Ok(Status::Online),
            "IDLE" => Ok(Status::Idle),
            "DO_NOT_DISTURB" | "DND" => Ok(Status::DoNotDisturb),
            "INVISIBLE" => Ok(Status::Invisible),
            "OFFLINE" => Ok(Status::Offline),
            _ => Err(anyhow!("status '{}' does not exist", name)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Online => "ONLINE",
            Status::Idle => "IDLE",
            Status::DoNotDisturb => "DO_NOT_DISTURB",
            Status::Invisible => "INVISIBLE",
            Status::Offline => "OFFLINE",
        };
        f.write_str(name)
    }
}

/// Kind of activity shown under the bot name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Playing,
    Streaming,
    Listening,
    Watching,
    Competing,
}

impl FromStr for ActivityType {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_uppercase().as_str() {
            "PLAYING" => Ok(ActivityType::Playing),
            "STREAMING" => Ok(ActivityType::Streaming),
            "LISTENING" => Ok(ActivityType::Listening),
            "WATCHING" => Ok(ActivityType::Watching),
            "COMPETING" => Ok(ActivityType::Competing),
            _ => Err(anyhow!("activity type '{}' does not exist", name)),
        }
    }
}

/// Activity shown under the bot name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub kind: ActivityType,
    pub text: String,
}

impl FromStr for Activity {
    type Err = anyhow::Error;

    /// Parses `"<TYPE> <text>"`, the text being everything after the first space.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, text) = value.split_once(' ').unwrap_or((value, ""));
        Ok(Activity {
            kind: kind.parse()?,
            text: text.trim().to_owned(),
        })
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.kind, self.text)
    }
}

/// Gateway intents the transport subscribes to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum GatewayIntent {
    Guilds,
    GuildMembers,
    GuildModeration,
    GuildEmojisAndStickers,
    GuildWebhooks,
    GuildInvites,
    GuildVoiceStates,
    GuildPresences,
    GuildMessages,
    GuildMessageReactions,
    GuildMessageTyping,
    DirectMessages,
    DirectMessageReactions,
    DirectMessageTyping,
    MessageContent,
    ScheduledEvents,
}

impl FromStr for GatewayIntent {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let intent = match name.to_uppercase().as_str() {
            "GUILDS" => GatewayIntent::Guilds,
            "GUILD_MEMBERS" => GatewayIntent::GuildMembers,
            "GUILD_MODERATION" | "GUILD_BANS" => GatewayIntent::GuildModeration,
            "GUILD_EMOJIS_AND_STICKERS" | "GUILD_EMOJIS" => GatewayIntent::GuildEmojisAndStickers,
            "GUILD_WEBHOOKS" => GatewayIntent::GuildWebhooks,
            "GUILD_INVITES" => GatewayIntent::GuildInvites,
            "GUILD_VOICE_STATES" => GatewayIntent::GuildVoiceStates,
            "GUILD_PRESENCES" => GatewayIntent::GuildPresences,
            "GUILD_MESSAGES" => GatewayIntent::GuildMessages,
            "GUILD_MESSAGE_REACTIONS" => GatewayIntent::GuildMessageReactions,
            "GUILD_MESSAGE_TYPING" => GatewayIntent::GuildMessageTyping,
            "DIRECT_MESSAGES" => GatewayIntent::DirectMessages,
            "DIRECT_MESSAGE_REACTIONS" => GatewayIntent::DirectMessageReactions,
            "DIRECT_MESSAGE_TYPING" => GatewayIntent::DirectMessageTyping,
            "MESSAGE_CONTENT" => GatewayIntent::MessageContent,
            "SCHEDULED_EVENTS" => GatewayIntent::ScheduledEvents,
            _ => return Err(()),
        };
        Ok(intent)
    }
}
