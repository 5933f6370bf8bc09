use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, Row};
use thiserror::Error;

/// Direction of a role change stored in `role_assignments.action_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Add,
    Remove,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown role action: {0}")]
pub struct UnknownRoleAction(pub String);

impl RoleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleAction::Add => "ADD",
            RoleAction::Remove => "REMOVE",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RoleAction::Add => "➕",
            RoleAction::Remove => "➖",
        }
    }
}

impl FromStr for RoleAction {
    type Err = UnknownRoleAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(RoleAction::Add),
            "REMOVE" => Ok(RoleAction::Remove),
            other => Err(UnknownRoleAction(other.to_string())),
        }
    }
}

/// A role ledger row as written by the role manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoleAssignment {
    pub guild_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub moderator_id: i64,
    pub action: RoleAction,
    pub reason: String,
    /// Set for temporary grants, e.g. "3 days"
    pub duration: Option<String>,
}

impl NewRoleAssignment {
    pub fn is_temporary(&self) -> bool {
        self.duration.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RoleAssignmentRecord {
    pub id: i64,
    pub guild_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub moderator_id: i64,
    pub action: RoleAction,
    pub reason: Option<String>,
    pub is_temporary: bool,
    pub duration: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, MySqlRow> for RoleAssignmentRecord {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let action: String = row.try_get("action_type")?;
        let action = action
            .parse()
            .map_err(|e: UnknownRoleAction| sqlx::Error::ColumnDecode {
                index: "action_type".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            guild_id: row.try_get("guild_id")?,
            user_id: row.try_get("user_id")?,
            role_id: row.try_get("role_id")?,
            moderator_id: row.try_get("moderator_id")?,
            action,
            reason: row.try_get("reason")?,
            is_temporary: row.try_get("is_temporary")?,
            duration: row.try_get("duration")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_action_strings() {
        assert_eq!("ADD".parse::<RoleAction>(), Ok(RoleAction::Add));
        assert_eq!("REMOVE".parse::<RoleAction>(), Ok(RoleAction::Remove));
        assert_eq!(RoleAction::Remove.as_str(), "REMOVE");
        assert_eq!(
            "add".parse::<RoleAction>(),
            Err(UnknownRoleAction("add".to_string()))
        );
    }

    #[test]
    fn test_temporary_follows_duration() {
        let mut entry = NewRoleAssignment {
            guild_id: 1,
            user_id: 2,
            role_id: 3,
            moderator_id: 4,
            action: RoleAction::Add,
            reason: "event".to_string(),
            duration: None,
        };
        assert!(!entry.is_temporary());

        entry.duration = Some("2 days".to_string());
        assert!(entry.is_temporary());
    }
}
