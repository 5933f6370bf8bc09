use chrono::{DateTime, Utc};
use serenity::all::{GuildId, RoleId, UserId};

use crate::db::models::{NewRoleAssignment, NewTempRole, TempRole};
use crate::db::queries::{role_assignment, temp_role};
use crate::db::Database;

/// Persistence the role manager depends on
#[serenity::async_trait]
pub trait RoleStore: Send + Sync {
    /// Append one row to the role ledger
    async fn record_assignment(&self, entry: &NewRoleAssignment) -> Result<(), sqlx::Error>;

    /// Track a temporary grant, replacing any earlier expiry for the same role
    async fn save_temp_role(&self, entry: &NewTempRole) -> Result<(), sqlx::Error>;

    async fn clear_temp_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<(), sqlx::Error>;

    async fn temp_roles_for(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<TempRole>, sqlx::Error>;

    async fn expired_temp_roles(&self, now: DateTime<Utc>) -> Result<Vec<TempRole>, sqlx::Error>;

    async fn delete_temp_role(&self, id: i64) -> Result<(), sqlx::Error>;
}

#[serenity::async_trait]
impl RoleStore for Database {
    async fn record_assignment(&self, entry: &NewRoleAssignment) -> Result<(), sqlx::Error> {
        role_assignment::record(self, entry).await?;
        Ok(())
    }

    async fn save_temp_role(&self, entry: &NewTempRole) -> Result<(), sqlx::Error> {
        temp_role::upsert(self, entry).await
    }

    async fn clear_temp_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<(), sqlx::Error> {
        temp_role::remove(
            self,
            guild_id.get() as i64,
            user_id.get() as i64,
            role_id.get() as i64,
        )
        .await?;
        Ok(())
    }

    async fn temp_roles_for(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<TempRole>, sqlx::Error> {
        temp_role::list_for_member(self, guild_id.get() as i64, user_id.get() as i64).await
    }

    async fn expired_temp_roles(&self, now: DateTime<Utc>) -> Result<Vec<TempRole>, sqlx::Error> {
        temp_role::list_expired(self, now).await
    }

    async fn delete_temp_role(&self, id: i64) -> Result<(), sqlx::Error> {
        temp_role::remove_by_id(self, id).await?;
        Ok(())
    }
}
