use chrono::{DateTime, Utc};

use crate::constants::database::TEMP_ROLES_TABLE;
use crate::db::gateway::{Database, SqlValue};
use crate::db::models::{NewTempRole, TempRole};

/// Track a temporary grant. Granting the same role again moves the expiry.
pub async fn upsert(db: &Database, entry: &NewTempRole) -> Result<(), sqlx::Error> {
    db.execute(
        r#"
        INSERT INTO temp_roles (guild_id, user_id, role_id, added_by, expires_at, reason)
        VALUES (?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            added_by = VALUES(added_by),
            expires_at = VALUES(expires_at),
            reason = VALUES(reason)
        "#,
        &[
            SqlValue::Int(entry.guild_id),
            SqlValue::Int(entry.user_id),
            SqlValue::Int(entry.role_id),
            SqlValue::Int(entry.added_by),
            SqlValue::from(entry.expires_at),
            SqlValue::from(entry.reason.as_str()),
        ],
    )
    .await?;
    Ok(())
}

/// Stop tracking a grant, e.g. after the role was removed by hand
pub async fn remove(db: &Database, guild_id: i64, user_id: i64, role_id: i64) -> Result<u64, sqlx::Error> {
    db.delete(
        TEMP_ROLES_TABLE,
        "guild_id = ? AND user_id = ? AND role_id = ?",
        &[
            SqlValue::Int(guild_id),
            SqlValue::Int(user_id),
            SqlValue::Int(role_id),
        ],
    )
    .await
}

pub async fn remove_by_id(db: &Database, id: i64) -> Result<u64, sqlx::Error> {
    db.delete(TEMP_ROLES_TABLE, "id = ?", &[SqlValue::Int(id)]).await
}

/// Drop every tracked grant in a guild the bot has left
pub async fn remove_for_guild(db: &Database, guild_id: i64) -> Result<u64, sqlx::Error> {
    db.delete(TEMP_ROLES_TABLE, "guild_id = ?", &[SqlValue::Int(guild_id)])
        .await
}

/// A member's tracked grants, soonest expiry first
pub async fn list_for_member(db: &Database, guild_id: i64, user_id: i64) -> Result<Vec<TempRole>, sqlx::Error> {
    db.fetch_all(
        r#"
        SELECT * FROM temp_roles
        WHERE guild_id = ? AND user_id = ?
        ORDER BY expires_at ASC
        "#,
        &[SqlValue::Int(guild_id), SqlValue::Int(user_id)],
    )
    .await
}

/// Every grant across all guilds that expired at or before `now`
pub async fn list_expired(db: &Database, now: DateTime<Utc>) -> Result<Vec<TempRole>, sqlx::Error> {
    db.fetch_all(
        r#"
        SELECT * FROM temp_roles
        WHERE expires_at <= ?
        ORDER BY expires_at ASC
        "#,
        &[SqlValue::from(now)],
    )
    .await
}
