use serenity::all::{RoleId, UserId};
use thiserror::Error;

/// Why a role change was refused, or what went wrong after it was made.
/// `Display` is the message shown to the invoking moderator.
#[derive(Error, Debug)]
pub enum RoleError {
    #[error("You need the `{0}` permission to use this command.")]
    PermissionDenied(String),

    #[error("<@{0}> is not a member of this server.")]
    TargetNotFound(UserId),

    #[error("That role does not exist in this server.")]
    RoleNotFound(RoleId),

    #[error("You cannot {0} the `@everyone` role!")]
    EveryoneRole(&'static str),

    #[error("<@&{0}> is managed by an integration and cannot be changed by hand!")]
    ManagedRole(RoleId),

    #[error("<@{user}> already has the <@&{role}> role!")]
    AlreadyHasRole { user: UserId, role: RoleId },

    #[error("<@{user}> doesn't have the <@&{role}> role!")]
    MissingRole { user: UserId, role: RoleId },

    #[error("I cannot {verb} <@&{role}> because it's higher than or equal to my highest role!")]
    BotOutranked { verb: &'static str, role: RoleId },

    #[error("You cannot {verb} <@&{role}> because it's higher than or equal to your highest role!")]
    ModeratorOutranked { verb: &'static str, role: RoleId },

    #[error("{0}")]
    InvalidDuration(String),

    #[error("<@{0}> has no roles to remove!")]
    NoRoles(UserId),

    #[error("No roles can be removed due to role hierarchy!")]
    NothingRemovable,

    #[error("{0}")]
    PlatformActionFailed(String),

    #[error("Could not save when the role should expire, so it was not added: {0}")]
    ExpiryNotSaved(String),

    #[error("{0}")]
    PersistenceFailed(String),

    #[error("Discord API error: {0}")]
    Platform(#[from] serenity::Error),
}

impl RoleError {
    /// True for failures that happen after the role change and never undo it
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, RoleError::PersistenceFailed(_))
    }
}
