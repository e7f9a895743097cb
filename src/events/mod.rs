//! Inbound platform events and their typed handlers.
//!
//! Every event a transport delivers is one variant of [`Event`]. The variant
//! is the event kind: handlers declare the payload type they are interested
//! in through [`EventHandler<E>`], and the [`EventRouter`] only forwards the
//! events whose kind matches that payload.
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use switchboard::{bot::Bot, events::{EventHandler, MemberJoined}};
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl EventHandler<MemberJoined> for Greeter {
//!     async fn handle(&self, _bot: &Bot, event: &MemberJoined) -> anyhow::Result<()> {
//!         log::info!("{} joined {}", event.member.display_name(), event.guild.name);
//!         Ok(())
//!     }
//! }
//! ```

use std::fmt;

use serde_json::Value;

use crate::platform::{Guild, Interaction, Member, Message, User};

mod router;

pub use crate::events::router::{EventHandler, EventRouter};

/// Discriminant of an [`Event`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum EventKind {
    Ready,
    MessageReceived,
    InteractionInvoked,
    MemberJoined,
    MemberLeft,
    Shutdown,
    Raw,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Ready => "ready",
            EventKind::MessageReceived => "messagereceived",
            EventKind::InteractionInvoked => "interactioninvoked",
            EventKind::MemberJoined => "memberjoined",
            EventKind::MemberLeft => "memberleft",
            EventKind::Shutdown => "shutdown",
            EventKind::Raw => "raw",
        };
        f.write_str(name)
    }
}

/// Emitted once the transport session is established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    /// The bot account
    pub user: User,
    /// Number of guilds the bot is part of
    pub guild_count: usize,
}

/// A member joined a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberJoined {
    pub guild: Guild,
    pub member: Member,
}

/// A user left a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLeft {
    pub guild: Guild,
    pub user: User,
}

/// The transport is closing its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shutdown;

/// Transport specific event the engine has no dedicated variant for.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Event name as given by the transport
    pub name: String,
    /// Untouched event payload
    pub payload: Value,
}

/// One inbound platform event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ready(Ready),
    MessageReceived(Message),
    InteractionInvoked(Interaction),
    MemberJoined(MemberJoined),
    MemberLeft(MemberLeft),
    Shutdown(Shutdown),
    Raw(RawEvent),
}

impl Event {
    /// Returns the kind of the event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Ready(_) => EventKind::Ready,
            Event::MessageReceived(_) => EventKind::MessageReceived,
            Event::InteractionInvoked(_) => EventKind::InteractionInvoked,
            Event::MemberJoined(_) => EventKind::MemberJoined,
            Event::MemberLeft(_) => EventKind::MemberLeft,
            Event::Shutdown(_) => EventKind::Shutdown,
            Event::Raw(_) => EventKind::Raw,
        }
    }
}

/// Which events a handler wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Every event
    Any,
    /// Only events of one kind
    Kind(EventKind),
}

impl Interest {
    /// Returns `true` when an event of `kind` matches this interest.
    pub fn matches(&self, kind: EventKind) -> bool {
        match self {
            Interest::Any => true,
            Interest::Kind(interest) => *interest == kind,
        }
    }
}

/// A payload type an [`EventHandler`] can be written against.
///
/// Implemented for each variant payload of [`Event`], and for [`Event`]
/// itself to receive every event.
pub trait EventPayload: Send + Sync + 'static {
    /// Interest declared by handlers of this payload.
    fn interest() -> Interest;
    /// Borrows the payload out of `event` when the kinds match.
    fn extract(event: &Event) -> Option<&Self>;
}

impl EventPayload for Event {
    fn interest() -> Interest {
        Interest::Any
    }

    fn extract(event: &Event) -> Option<&Self> {
        Some(event)
    }
}

macro_rules! event_payload {
    ($payload:ty, $variant:ident) => {
        impl EventPayload for $payload {
            fn interest() -> Interest {
                Interest::Kind(EventKind::$variant)
            }

            fn extract(event: &Event) -> Option<&Self> {
                match event {
                    Event::$variant(payload) => Some(payload),
                    _ => None,
                }
            }
        }
    };
}

event_payload!(Ready, Ready);
event_payload!(Message, MessageReceived);
event_payload!(Interaction, InteractionInvoked);
event_payload!(MemberJoined, MemberJoined);
event_payload!(MemberLeft, MemberLeft);
event_payload!(Shutdown, Shutdown);
event_payload!(RawEvent, Raw);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interest_any_matches_every_kind() {
        assert!(Interest::Any.matches(EventKind::Ready));
        assert!(Interest::Any.matches(EventKind::Raw));
    }

    #[test]
    fn test_interest_kind_matches_only_its_kind() {
        let interest = Interest::Kind(EventKind::MemberLeft);
        assert!(interest.matches(EventKind::MemberLeft));
        assert!(!interest.matches(EventKind::MemberJoined));
    }

    #[test]
    fn test_extract_matching_payload() {
        let event = Event::Raw(RawEvent {
            name: "typing_start".to_string(),
            payload: json!({ "user": "42" }),
        });

        assert_eq!(event.kind(), EventKind::Raw);
        let raw = RawEvent::extract(&event).unwrap();
        assert_eq!(raw.name, "typing_start");
        assert!(Shutdown::extract(&event).is_none());
        assert!(Event::extract(&event).is_some());
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::MessageReceived.to_string(), "messagereceived");
        assert_eq!(EventKind::Shutdown.to_string(), "shutdown");
    }
}
