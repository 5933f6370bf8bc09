use chrono::{DateTime, Utc};
use serenity::all::ChannelId;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GuildConfig {
    pub id: i64,
    pub guild_id: i64,
    pub mod_log_channel_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuildConfig {
    /// The configured mod-log channel, if any
    pub fn mod_log_channel(&self) -> Option<ChannelId> {
        self.mod_log_channel_id
            .and_then(|id| u64::try_from(id).ok())
            .filter(|id| *id != 0)
            .map(ChannelId::new)
    }
}
