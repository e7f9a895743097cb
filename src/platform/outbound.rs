//! Outbound sink towards the chat platform.

use mockall::automock;

use crate::{
    commands::InteractionSpec,
    platform::{Channel, Embed, Interaction, Message},
};

/// Operations the dispatcher and the executors perform on the platform.
///
/// Every method queues the operation and returns immediately: the dispatcher
/// never waits for a delivery confirmation. Transports report their own
/// delivery failures.
#[automock]
pub trait Outbound: Send + Sync {
    /// Replies to `message` with `embed`.
    fn reply_embed(&self, message: &Message, embed: &Embed);
    /// Sends `embed` in `channel`.
    fn send_embed(&self, channel: &Channel, embed: &Embed);
    /// Acknowledges `interaction`, telling the platform an answer will follow.
    fn defer(&self, interaction: &Interaction);
    /// Answers a deferred `interaction`, visible only to its author when `ephemeral`.
    fn send_followup(&self, interaction: &Interaction, embed: &Embed, ephemeral: bool);
    /// Declares an interaction command and its parameters to the platform.
    fn register_interaction(&self, spec: &InteractionSpec);
}
