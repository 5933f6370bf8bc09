use serenity::all::GuildId;

use crate::db::models::{GuildConfig, NewPunishment};
use crate::db::queries::{guild_config, punishment};
use crate::db::Database;

/// Persistence the moderation pipeline depends on
#[serenity::async_trait]
pub trait ModerationStore: Send + Sync {
    /// Guild settings, created with defaults on first access
    async fn guild_config(&self, guild_id: GuildId) -> Result<GuildConfig, sqlx::Error>;

    /// Append one row to the punishment ledger
    async fn record_punishment(&self, entry: &NewPunishment) -> Result<(), sqlx::Error>;
}

#[serenity::async_trait]
impl ModerationStore for Database {
    async fn guild_config(&self, guild_id: GuildId) -> Result<GuildConfig, sqlx::Error> {
        guild_config::get_or_create(self, guild_id.get() as i64).await
    }

    async fn record_punishment(&self, entry: &NewPunishment) -> Result<(), sqlx::Error> {
        punishment::record(self, entry).await?;
        Ok(())
    }
}
