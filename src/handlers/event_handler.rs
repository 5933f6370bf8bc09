use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::db::queries::{guild_config, temp_role};

pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!(
                "Bot ready as {} in {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }

        FullEvent::GuildCreate { guild, is_new } => {
            // Only guilds joined while running; startup replays every guild with is_new = false
            if is_new.unwrap_or(false) {
                match guild_config::get_or_create(&data.db, guild.id.get() as i64).await {
                    Ok(_) => info!(guild_id = %guild.id, "Joined guild {}", guild.name),
                    Err(e) => error!(guild_id = %guild.id, "Failed to create guild config: {}", e),
                }
            }
        }

        FullEvent::GuildDelete { incomplete, .. } => {
            // An outage also sends GuildDelete; only a real removal drops pending expiries
            if incomplete.unavailable {
                debug!("Guild {} became unavailable", incomplete.id);
                return Ok(());
            }

            // Config and both ledgers are kept so history survives a re-invite
            match temp_role::remove_for_guild(&data.db, incomplete.id.get() as i64).await {
                Ok(dropped) => info!(guild_id = %incomplete.id, dropped, "Left guild"),
                Err(e) => error!(guild_id = %incomplete.id, "Failed to drop temp roles: {}", e),
            }
        }

        _ => {}
    }

    Ok(())
}
