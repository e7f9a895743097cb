//! Chat platform entities seen by the dispatch engine.
//!
//! The engine never talks to a chat platform directly. A transport converts
//! whatever it receives into the plain structures of this module, pushes them
//! through [`Bot::handle_event`](crate::bot::Bot::handle_event) wrapped in an
//! [`Event`](crate::events::Event), and receives the bot answers through the
//! [`Outbound`] trait.
//!
//! # Module Organization
//!
//! - [`embed`] - Embed payloads and the default embeds of the bot
//! - [`outbound`] - The outbound sink implemented by transports

mod embed;
mod outbound;

pub use crate::platform::{
    embed::{DefaultEmbeds, ERROR_COLOR, Embed, EmbedField, INFO_COLOR},
    outbound::{MockOutbound, Outbound},
};
use crate::permissions::PermissionSet;

/// A community grouping channels and members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    /// Platform identifier of the guild
    pub id: String,
    /// Display name of the guild
    pub name: String,
}

/// A text channel inside a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Platform identifier of the channel
    pub id: String,
    /// Display name of the channel
    pub name: String,
}

/// A platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Platform identifier of the user
    pub id: String,
    /// Account name of the user
    pub name: String,
    /// Whether the account is a bot or service account
    pub bot: bool,
}

/// A user scoped to one guild, carrying the guild specific permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The underlying account
    pub user: User,
    /// Guild nickname, if any
    pub nickname: Option<String>,
    /// Permissions held by the member in the guild
    pub permissions: PermissionSet,
}

impl Member {
    /// Returns the nickname of the member or its account name.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user.name)
    }
}

/// A text message received from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Platform identifier of the message
    pub id: String,
    /// Raw text content of the message
    pub content: String,
    /// Author account
    pub author: User,
    /// Author as a guild member, absent for direct messages or unresolved members
    pub member: Option<Member>,
    /// Guild where the message was sent, absent for direct messages
    pub guild: Option<Guild>,
    /// Channel where the message was sent
    pub channel: Channel,
}

/// One named option value sent with an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOption {
    /// Parameter name
    pub name: String,
    /// Raw value as sent by the platform
    pub value: String,
}

/// A structured command invocation (a "slash command").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Platform identifier of the interaction
    pub id: String,
    /// Name of the invoked interaction command
    pub name: String,
    /// Invoking account
    pub user: User,
    /// Invoking account as a guild member
    pub member: Option<Member>,
    /// Guild where the interaction was invoked
    pub guild: Option<Guild>,
    /// Channel where the interaction was invoked
    pub channel: Channel,
    /// Option values, in the order the platform sent them
    pub options: Vec<InteractionOption>,
}

impl Interaction {
    /// Returns the value of the option named `name`.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| option.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User {
            id: "1".to_string(),
            name: "alice".to_string(),
            bot: false,
        }
    }

    #[test]
    fn test_member_display_name_prefers_nickname() {
        let member = Member {
            user: create_test_user(),
            nickname: Some("Ally".to_string()),
            permissions: PermissionSet::new(),
        };
        assert_eq!(member.display_name(), "Ally");
    }

    #[test]
    fn test_member_display_name_falls_back_to_user_name() {
        let member = Member {
            user: create_test_user(),
            nickname: None,
            permissions: PermissionSet::new(),
        };
        assert_eq!(member.display_name(), "alice");
    }

    #[test]
    fn test_interaction_option_lookup() {
        let interaction = Interaction {
            id: "i1".to_string(),
            name: "ban".to_string(),
            user: create_test_user(),
            member: None,
            guild: None,
            channel: Channel {
                id: "c1".to_string(),
                name: "general".to_string(),
            },
            options: vec![InteractionOption {
                name: "reason".to_string(),
                value: "spam".to_string(),
            }],
        };

        assert_eq!(interaction.option("reason"), Some("spam"));
        assert_eq!(interaction.option("duration"), None);
    }
}
