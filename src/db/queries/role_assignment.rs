use crate::constants::database::ROLE_ASSIGNMENTS_TABLE;
use crate::db::gateway::{Database, SqlValue};
use crate::db::models::{NewRoleAssignment, RoleAssignmentRecord};

/// Append one row to the role ledger and return its row id
pub async fn record(db: &Database, entry: &NewRoleAssignment) -> Result<u64, sqlx::Error> {
    db.insert(
        ROLE_ASSIGNMENTS_TABLE,
        &[
            ("guild_id", SqlValue::Int(entry.guild_id)),
            ("user_id", SqlValue::Int(entry.user_id)),
            ("role_id", SqlValue::Int(entry.role_id)),
            ("moderator_id", SqlValue::Int(entry.moderator_id)),
            ("action_type", SqlValue::from(entry.action.as_str())),
            ("reason", SqlValue::from(entry.reason.as_str())),
            ("is_temporary", SqlValue::from(entry.is_temporary())),
            ("duration", SqlValue::from(entry.duration.clone())),
        ],
    )
    .await
}

/// A member's most recent role changes, newest first
pub async fn list_for_member(
    db: &Database,
    guild_id: i64,
    user_id: i64,
    limit: i64,
) -> Result<Vec<RoleAssignmentRecord>, sqlx::Error> {
    db.fetch_all(
        r#"
        SELECT * FROM role_assignments
        WHERE guild_id = ? AND user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
        &[
            SqlValue::Int(guild_id),
            SqlValue::Int(user_id),
            SqlValue::Int(limit),
        ],
    )
    .await
}
