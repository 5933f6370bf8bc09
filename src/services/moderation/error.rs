use serenity::all::UserId;
use thiserror::Error;

/// Why a moderation action was refused, or what went wrong after it was applied.
/// `Display` is the message shown to the invoking moderator.
#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("You need the `{0}` permission to use this command.")]
    PermissionDenied(String),

    #[error("<@{0}> is not a member of this server.")]
    TargetNotFound(UserId),

    #[error("{0}")]
    InvalidTarget(String),

    #[error("You cannot {0} someone with a higher or equal role!")]
    HierarchyViolation(&'static str),

    #[error("{0}")]
    InvalidDuration(String),

    #[error("This member is not timed out!")]
    NotTimedOut,

    #[error("{0}")]
    PlatformActionFailed(String),

    #[error("Could not deliver {0}")]
    NotificationFailed(String),

    #[error("{0}")]
    PersistenceFailed(String),

    #[error("Discord API error: {0}")]
    Platform(#[from] serenity::Error),
}

impl ModerationError {
    /// True for failures that happen after enforcement and never abort it
    pub fn is_non_fatal(&self) -> bool {
        matches!(
            self,
            ModerationError::NotificationFailed(_) | ModerationError::PersistenceFailed(_)
        )
    }
}
