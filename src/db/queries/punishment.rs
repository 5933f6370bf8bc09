use crate::constants::database::PUNISHMENT_TABLE;
use crate::db::gateway::{Database, SqlValue};
use crate::db::models::{NewPunishment, PunishmentRecord};

/// Append one row to the ledger and return its row id
pub async fn record(db: &Database, entry: &NewPunishment) -> Result<u64, sqlx::Error> {
    db.insert(
        PUNISHMENT_TABLE,
        &[
            ("punishment_id", SqlValue::from(entry.punishment_id.as_str())),
            ("guild_id", SqlValue::Int(entry.guild_id)),
            ("user_id", SqlValue::Int(entry.user_id)),
            ("moderator_id", SqlValue::Int(entry.moderator_id)),
            ("action_type", SqlValue::from(entry.action_type.as_str())),
            ("reason", SqlValue::from(entry.reason.as_str())),
            ("duration", SqlValue::from(entry.duration.clone())),
        ],
    )
    .await
}

/// Every ledger row for a guild, newest first
pub async fn list_by_guild(db: &Database, guild_id: i64) -> Result<Vec<PunishmentRecord>, sqlx::Error> {
    db.fetch_all(
        r#"
        SELECT * FROM punishment_actions
        WHERE guild_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
        &[SqlValue::Int(guild_id)],
    )
    .await
}

/// The most recent rows for a guild, optionally narrowed to one punished user
pub async fn list_recent(
    db: &Database,
    guild_id: i64,
    user_id: Option<i64>,
    limit: i64,
) -> Result<Vec<PunishmentRecord>, sqlx::Error> {
    match user_id {
        Some(user_id) => {
            db.fetch_all(
                r#"
                SELECT * FROM punishment_actions
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
        None => {
            db.fetch_all(
                r#"
                SELECT * FROM punishment_actions
                WHERE guild_id = ?
                ORDER BY created_at DESC, id DESC
                LIMIT ?
                "#,
                &[SqlValue::Int(guild_id), SqlValue::Int(limit)],
            )
            .await
        }
    }
}

/// Look up a single punishment by its public identifier
pub async fn find(
    db: &Database,
    guild_id: i64,
    punishment_id: &str,
) -> Result<Option<PunishmentRecord>, sqlx::Error> {
    db.fetch_one(
        "SELECT * FROM punishment_actions WHERE guild_id = ? AND punishment_id = ?",
        &[SqlValue::Int(guild_id), SqlValue::from(punishment_id)],
    )
    .await
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::db::models::ActionType;
    use crate::db::test_database;

    const GUILD: i64 = 900_000_000_000_000_101;

    fn entry(action_type: ActionType, duration: Option<&str>) -> NewPunishment {
        NewPunishment {
            punishment_id: Uuid::new_v4().to_string(),
            guild_id: GUILD,
            user_id: 42,
            moderator_id: 7,
            action_type,
            reason: "spam".to_string(),
            duration: duration.map(str::to_string),
        }
    }

    #[tokio::test]
    #[ignore = "requires a MySQL database (DATABASE_URL)"]
    async fn test_record_and_read_back() {
        let db = test_database().await;

        let ban = entry(ActionType::Ban, None);
        let timeout = entry(ActionType::Timeout, Some("2 hours"));
        record(&db, &ban).await.unwrap();
        record(&db, &timeout).await.unwrap();

        let found = find(&db, GUILD, &timeout.punishment_id).await.unwrap().unwrap();
        assert_eq!(found.action_type, ActionType::Timeout);
        assert_eq!(found.duration.as_deref(), Some("2 hours"));
        assert_eq!(found.reason.as_deref(), Some("spam"));

        let all = list_by_guild(&db, GUILD).await.unwrap();
        assert!(all.len() >= 2);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let recent = list_recent(&db, GUILD, Some(42), 1).await.unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a MySQL database (DATABASE_URL)"]
    async fn test_duplicate_punishment_id_rejected() {
        let db = test_database().await;
        let ban = entry(ActionType::Ban, None);
        record(&db, &ban).await.unwrap();
        assert!(record(&db, &ban).await.is_err());
    }
}
