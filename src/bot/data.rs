use std::fmt;
use std::sync::Arc;

use crate::bot::error::Error;
use crate::config::Settings;
use crate::db::Database;

/// Shared data available to all commands and handlers
pub struct Data {
    pub db: Database,
    pub settings: Settings,
}

impl Data {
    pub fn new(db: Database, settings: Settings) -> Self {
        Self { db, settings }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("guild_id", &self.settings.guild_id)
            .field("database", &self.settings.database)
            .field("pool_size", &self.db.pool().size())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, Error>;
