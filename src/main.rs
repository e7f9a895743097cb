//! Switchboard - A configurable command and event dispatch engine for chat bots.
//!
//! This binary loads the configuration and the command files, then runs the
//! bot against the console transport: every line typed on standard input is
//! an event, every answer is printed as Markdown.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! bot:
//!   token: "your-token"
//!   intents: ["GUILDS", "GUILD_MESSAGES", "MESSAGE_CONTENT"]
//!   status: "ONLINE"
//!   activity: "LISTENING !help"
//!   prefix: "!"
//! ```
//!
//! When the file does not exist, a default one is written and the bot stops
//! so it can be edited.
//!
//! # Usage
//!
//! ```bash
//! switchboard --config config.yaml --commands commands --interactions interactions
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//! - `SWITCHBOARD_BOT__*` - Override any value of the `bot` section

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use switchboard::{
    bot::Bot,
    commands::{ExecutorRegistry, actions},
    config::Config,
    permissions::Permission,
    platform::Outbound,
    transport::{ConsoleOutbound, ConsoleTransport},
};

/// Command-line arguments.
///
/// # Examples
///
/// ```bash
/// switchboard --config config.yaml --commands ./commands --shallow
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// Written with default values when missing.
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directory holding the text command files.
    #[arg(long, default_value = "commands")]
    commands: PathBuf,

    /// Directory holding the interaction files.
    #[arg(long, default_value = "interactions")]
    interactions: PathBuf,

    /// Only load the files placed directly in the command directories,
    /// ignoring their subdirectories.
    #[arg(long)]
    shallow: bool,
}

/// Main entry point.
///
/// 1. **Logging Setup**: `info` level by default, overridden by `RUST_LOG`
/// 2. **Configuration Loading**: writes the default configuration and stops
///    when it cannot be loaded
/// 3. **Command Loading**: registers the built-in executors, then loads the
///    command and interaction directories
/// 4. **Bot Execution**: runs the console transport until standard input
///    is closed
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting switchboard {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config file: {:#}", e);
            match Config::write_default(&args.config) {
                Ok(true) => error!("Edit '{}' then restart the bot", args.config.display()),
                Ok(false) => {}
                Err(e) => error!("Failed to write default config file: {:#}", e),
            }
            return;
        }
    };

    // Only network transports use the presence and the intents
    let presence = config
        .bot
        .status()
        .and_then(|status| config.bot.activity().map(|activity| (status, activity)));
    let (status, activity) = match presence {
        Ok(presence) => presence,
        Err(e) => {
            error!("Invalid presence in config file: {:#}", e);
            return;
        }
    };
    info!(
        "presence {} {}, intents {:?}",
        status,
        activity.map(|activity| activity.to_string()).unwrap_or_default(),
        config.bot.gateway_intents()
    );

    let mut registry = ExecutorRegistry::new();
    actions::register_builtins(&mut registry);

    let outbound: Arc<dyn Outbound> = Arc::new(ConsoleOutbound::stdout());
    let mut bot = Bot::new(&config.bot.prefix, outbound, registry);
    bot.register_commands(&args.commands, !args.shallow);
    bot.register_interactions(&args.interactions, !args.shallow);

    let transport = ConsoleTransport::new("console", [Permission::Administrator].into());
    if let Err(e) = transport.run(Arc::new(bot)).await {
        error!("Console transport stopped: {:#}", e);
    }
}
