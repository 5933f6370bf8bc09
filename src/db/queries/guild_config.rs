use chrono::Utc;

use crate::constants::database::GUILDS_TABLE;
use crate::db::gateway::{Database, SqlValue};
use crate::db::models::GuildConfig;

pub async fn get(db: &Database, guild_id: i64) -> Result<Option<GuildConfig>, sqlx::Error> {
    db.fetch_one::<GuildConfig>(
        "SELECT * FROM guilds WHERE guild_id = ?",
        &[SqlValue::Int(guild_id)],
    )
    .await
}

/// Return the guild's config row, creating a default one first if needed.
/// The UNIQUE key on `guild_id` makes concurrent first touches collapse to one row.
pub async fn get_or_create(db: &Database, guild_id: i64) -> Result<GuildConfig, sqlx::Error> {
    if let Some(config) = get(db, guild_id).await? {
        return Ok(config);
    }

    db.execute(
        r#"
        INSERT INTO guilds (guild_id)
        VALUES (?)
        ON DUPLICATE KEY UPDATE guild_id = guild_id
        "#,
        &[SqlValue::Int(guild_id)],
    )
    .await?;

    get(db, guild_id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Set (or clear, with `None`) the mod-log channel
pub async fn set_mod_log_channel(
    db: &Database,
    guild_id: i64,
    channel_id: Option<i64>,
) -> Result<GuildConfig, sqlx::Error> {
    // Ensure config exists
    get_or_create(db, guild_id).await?;

    db.update(
        GUILDS_TABLE,
        &[
            ("mod_log_channel_id", SqlValue::from(channel_id)),
            ("updated_at", SqlValue::from(Utc::now())),
        ],
        "guild_id = ?",
        &[SqlValue::Int(guild_id)],
    )
    .await?;

    get(db, guild_id).await?.ok_or(sqlx::Error::RowNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    const GUILD: i64 = 900_000_000_000_000_001;

    #[tokio::test]
    #[ignore = "requires a MySQL database (DATABASE_URL)"]
    async fn test_concurrent_get_or_create_makes_one_row() {
        let db = test_database().await;
        db.execute("DELETE FROM guilds WHERE guild_id = ?", &[SqlValue::Int(GUILD)])
            .await
            .unwrap();

        let (a, b) = tokio::join!(get_or_create(&db, GUILD), get_or_create(&db, GUILD));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(a.mod_log_channel_id, None);

        let rows: Vec<GuildConfig> = db
            .fetch_all("SELECT * FROM guilds WHERE guild_id = ?", &[SqlValue::Int(GUILD)])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a MySQL database (DATABASE_URL)"]
    async fn test_set_and_clear_mod_log_channel() {
        let db = test_database().await;

        let config = set_mod_log_channel(&db, GUILD + 1, Some(1234)).await.unwrap();
        assert_eq!(config.mod_log_channel_id, Some(1234));

        let config = set_mod_log_channel(&db, GUILD + 1, None).await.unwrap();
        assert_eq!(config.mod_log_channel_id, None);
    }
}
