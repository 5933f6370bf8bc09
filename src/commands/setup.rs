use poise::serenity_prelude::Channel;
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::queries::guild_config;
use crate::utils::formatting::mention_channel;

/// Setup commands for configuring the bot
#[poise::command(
    slash_command,
    subcommands("modlog"),
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn setup(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("Use one of the subcommands: `/setup modlog`").await?;
    Ok(())
}

/// Set the channel moderation actions are logged to; leave empty to disable
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn modlog(
    ctx: Context<'_>,
    #[description = "Text channel for the mod log"]
    #[channel_types("Text")]
    channel: Option<Channel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let channel_id = channel.as_ref().map(|c| c.id().get());

    guild_config::set_mod_log_channel(
        &ctx.data().db,
        guild_id.get() as i64,
        channel_id.map(|id| id as i64),
    )
    .await?;

    info!(guild_id = %guild_id, channel_id = ?channel_id, "Mod log channel updated");

    let embed = match channel_id {
        Some(id) => embeds::success_embed()
            .title("Mod Log Set")
            .description(format!("Moderation actions will be logged to {}", mention_channel(id))),
        None => embeds::success_embed()
            .title("Mod Log Disabled")
            .description("Moderation actions will no longer be logged to a channel."),
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
