use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, Row};
use thiserror::Error;

/// Kind of enforcement action stored in `punishment_actions.action_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Ban,
    Kick,
    Timeout,
    Untimeout,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown action type: {0}")]
pub struct UnknownActionType(pub String);

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Ban => "BAN",
            ActionType::Kick => "KICK",
            ActionType::Timeout => "TIMEOUT",
            ActionType::Untimeout => "UNTIMEOUT",
        }
    }

    /// Imperative verb, e.g. "You cannot ban ..."
    pub fn verb(&self) -> &'static str {
        match self {
            ActionType::Ban => "ban",
            ActionType::Kick => "kick",
            ActionType::Timeout => "timeout",
            ActionType::Untimeout => "remove the timeout of",
        }
    }

    /// Audit-log suffix, e.g. "Banned by mod#0001"
    pub fn done_by(&self) -> &'static str {
        match self {
            ActionType::Ban => "Banned",
            ActionType::Kick => "Kicked",
            ActionType::Timeout => "Timed out",
            ActionType::Untimeout => "Removed",
        }
    }
}

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BAN" => Ok(ActionType::Ban),
            "KICK" => Ok(ActionType::Kick),
            "TIMEOUT" => Ok(ActionType::Timeout),
            "UNTIMEOUT" => Ok(ActionType::Untimeout),
            other => Err(UnknownActionType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger row as written by the moderation pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPunishment {
    pub punishment_id: String,
    pub guild_id: i64,
    pub user_id: i64,
    pub moderator_id: i64,
    pub action_type: ActionType,
    pub reason: String,
    pub duration: Option<String>,
}

/// A persisted ledger row. Rows are never updated or deleted.
#[derive(Debug, Clone)]
pub struct PunishmentRecord {
    pub id: i64,
    pub punishment_id: String,
    pub guild_id: i64,
    pub user_id: i64,
    pub moderator_id: i64,
    pub action_type: ActionType,
    pub reason: Option<String>,
    pub duration: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, MySqlRow> for PunishmentRecord {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let action_type: String = row.try_get("action_type")?;
        let action_type = action_type
            .parse()
            .map_err(|e: UnknownActionType| sqlx::Error::ColumnDecode {
                index: "action_type".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            punishment_id: row.try_get("punishment_id")?,
            guild_id: row.try_get("guild_id")?,
            user_id: row.try_get("user_id")?,
            moderator_id: row.try_get("moderator_id")?,
            action_type,
            reason: row.try_get("reason")?,
            duration: row.try_get("duration")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_strings() {
        for action in [
            ActionType::Ban,
            ActionType::Kick,
            ActionType::Timeout,
            ActionType::Untimeout,
        ] {
            assert_eq!(action.as_str().parse::<ActionType>(), Ok(action));
        }
        assert_eq!(ActionType::Untimeout.to_string(), "UNTIMEOUT");
    }

    #[test]
    fn test_unknown_action_type() {
        assert_eq!(
            "WARN".parse::<ActionType>(),
            Err(UnknownActionType("WARN".to_string()))
        );
        assert!("ban".parse::<ActionType>().is_err());
    }
}
