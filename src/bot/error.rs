use thiserror::Error;

use crate::services::moderation::ModerationError;
use crate::services::roles::RoleError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error(transparent)]
    Role(#[from] RoleError),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }

    /// Text shown to the user when a command fails
    pub fn user_message(&self) -> String {
        match self {
            Error::Database(_) => "Something went wrong talking to the database. Please try again.".to_string(),
            Error::Serenity(e) => format!("Discord rejected the request: {}", e),
            Error::Moderation(e) => e.to_string(),
            Error::Role(e) => e.to_string(),
            Error::Custom(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_details_are_not_shown_to_users() {
        let err = Error::from(sqlx::Error::PoolTimedOut);
        assert!(!err.user_message().contains("pool"));
        assert!(err.to_string().starts_with("Database error"));
    }

    #[test]
    fn test_moderation_message_passes_through() {
        let err = Error::from(ModerationError::NotTimedOut);
        assert_eq!(err.user_message(), "This member is not timed out!");
        assert_eq!(err.to_string(), "This member is not timed out!");
    }

    #[test]
    fn test_role_message_passes_through() {
        let err = Error::from(RoleError::NothingRemovable);
        assert_eq!(err.user_message(), "No roles can be removed due to role hierarchy!");
    }
}
