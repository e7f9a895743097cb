//! Guild permissions and the permission gate.
//!
//! Command files name permissions in upper snake case (`MANAGE_SERVER`,
//! `MESSAGE_SEND`, ...). Names are upper-cased before lookup so `kick_members`
//! is accepted as well.

use std::{collections::BTreeSet, str::FromStr};

use log::error;
use thiserror::Error;

use crate::platform::Member;

/// Set of permissions, either held by a member or required by a command.
pub type PermissionSet = BTreeSet<Permission>;

/// A named grant controlling what a member may do in a guild.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Permission {
    Administrator,
    ManageServer,
    ManageChannels,
    ManageRoles,
    ManageWebhooks,
    ViewAuditLogs,
    CreateInstantInvite,
    KickMembers,
    BanMembers,
    ModerateMembers,
    NicknameChange,
    NicknameManage,
    ViewChannel,
    MessageSend,
    MessageManage,
    MessageEmbedLinks,
    MessageAttachFiles,
    MessageHistory,
    MessageMentionEveryone,
    MessageAddReaction,
    UseApplicationCommands,
    VoiceConnect,
    VoiceSpeak,
    VoiceMuteOthers,
    VoiceDeafOthers,
    VoiceMoveOthers,
}

/// Error returned when a permission name is not known.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("permission '{0}' does not exist")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let permission = match name.to_uppercase().as_str() {
            "ADMINISTRATOR" => Permission::Administrator,
            "MANAGE_SERVER" => Permission::ManageServer,
            "MANAGE_CHANNEL" | "MANAGE_CHANNELS" => Permission::ManageChannels,
            "MANAGE_ROLES" => Permission::ManageRoles,
            "MANAGE_WEBHOOKS" => Permission::ManageWebhooks,
            "VIEW_AUDIT_LOGS" => Permission::ViewAuditLogs,
            "CREATE_INSTANT_INVITE" => Permission::CreateInstantInvite,
            "KICK_MEMBERS" => Permission::KickMembers,
            "BAN_MEMBERS" => Permission::BanMembers,
            "MODERATE_MEMBERS" => Permission::ModerateMembers,
            "NICKNAME_CHANGE" => Permission::NicknameChange,
            "NICKNAME_MANAGE" => Permission::NicknameManage,
            "VIEW_CHANNEL" => Permission::ViewChannel,
            "MESSAGE_SEND" => Permission::MessageSend,
            "MESSAGE_MANAGE" => Permission::MessageManage,
            "MESSAGE_EMBED_LINKS" => Permission::MessageEmbedLinks,
            "MESSAGE_ATTACH_FILES" => Permission::MessageAttachFiles,
            "MESSAGE_HISTORY" => Permission::MessageHistory,
            "MESSAGE_MENTION_EVERYONE" => Permission::MessageMentionEveryone,
            "MESSAGE_ADD_REACTION" => Permission::MessageAddReaction,
            "USE_APPLICATION_COMMANDS" => Permission::UseApplicationCommands,
            "VOICE_CONNECT" => Permission::VoiceConnect,
            "VOICE_SPEAK" => Permission::VoiceSpeak,
            "VOICE_MUTE_OTHERS" => Permission::VoiceMuteOthers,
            "VOICE_DEAF_OTHERS" => Permission::VoiceDeafOthers,
            "VOICE_MOVE_OTHERS" => Permission::VoiceMoveOthers,
            _ => return Err(UnknownPermission(name.to_uppercase())),
        };

        Ok(permission)
    }
}

/// Parses a list of permission names.
///
/// Unknown names are logged and skipped, they never invalidate the list.
/// `owner` names the command the list belongs to in the log line.
pub fn parse_permissions(owner: &str, names: &[String]) -> PermissionSet {
    names
        .iter()
        .filter_map(|name| match name.parse::<Permission>() {
            Ok(permission) => Some(permission),
            Err(e) => {
                error!("loading '{}': failed to load permission: {}", owner, e);
                None
            }
        })
        .collect()
}

/// Decides whether a member may run a command.
pub struct PermissionGate;

impl PermissionGate {
    /// Returns `true` when `member` satisfies `required`.
    ///
    /// An empty `required` set is always satisfied and administrators satisfy
    /// every set. Otherwise the member must hold every required permission.
    pub fn allowed(member: &Member, required: &PermissionSet) -> bool {
        required.is_empty()
            || member.permissions.contains(&Permission::Administrator)
            || required.is_subset(&member.permissions)
    }
}
