use chrono::{DateTime, Utc};
use serenity::all::{GuildId, RoleId, UserId};

/// A role granted until `expires_at`; the sweeper removes it afterwards
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TempRole {
    pub id: i64,
    pub guild_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub added_by: i64,
    pub expires_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TempRole {
    /// Discord ids for the row; `None` if a stored id is not a valid snowflake
    pub fn ids(&self) -> Option<(GuildId, UserId, RoleId)> {
        let id = |raw: i64| u64::try_from(raw).ok().filter(|id| *id != 0);
        Some((
            GuildId::new(id(self.guild_id)?),
            UserId::new(id(self.user_id)?),
            RoleId::new(id(self.role_id)?),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTempRole {
    pub guild_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub added_by: i64,
    pub expires_at: DateTime<Utc>,
    pub reason: String,
}
