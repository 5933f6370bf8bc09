use poise::serenity_prelude::User;
use tracing::{info, warn};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::bot::reply::send_private;
use crate::commands::user_summary;
use crate::constants::embeds;
use crate::constants::timeouts::{HISTORY_PAGE_SIZE, MAX_DELETE_MESSAGE_DAYS};
use crate::db::queries::punishment;
use crate::services::moderation::notice;
use crate::services::moderation::{
    DiscordPlatform, DurationUnit, ModerationAction, ModerationError, ModerationPipeline,
    ModerationRequest,
};

fn log_refusal(ctx: Context<'_>, request: &ModerationRequest, error: &ModerationError) {
    info!(
        guild_id = %request.guild_id,
        user_id = %request.target.id,
        moderator_id = %ctx.author().id,
        "{} refused: {}",
        request.action.action_type(),
        error
    );
}

/// Check preconditions, then defer and enforce. Refusals are only shown to the moderator.
async fn run_action(
    ctx: Context<'_>,
    user: User,
    reason: Option<String>,
    action: ModerationAction,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let guild_name = ctx
        .guild()
        .map(|guild| guild.name.clone())
        .unwrap_or_else(|| "this server".to_string());

    let request = ModerationRequest {
        guild_id,
        guild_name,
        moderator: user_summary(ctx.author()),
        target: user_summary(&user),
        reason,
        action,
    };

    let platform = DiscordPlatform::new(ctx.serenity_context());
    let pipeline = ModerationPipeline::new(&platform, &ctx.data().db);

    // Nothing has been sent yet, so a refusal can still be the ephemeral initial response
    let authorized = match pipeline.authorize(&request).await {
        Ok(authorized) => authorized,
        Err(e) => {
            log_refusal(ctx, &request, &e);
            send_private(ctx, notice::failure_embed(&e)).await?;
            return Ok(());
        }
    };

    ctx.defer().await?;

    match pipeline.enforce(&request, authorized).await {
        Ok(outcome) => {
            let embed = notice::confirmation_embed(&request, &outcome);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            log_refusal(ctx, &request, &e);
            send_private(ctx, notice::failure_embed(&e)).await?;
        }
    }

    Ok(())
}

/// Moderation commands
#[poise::command(
    slash_command,
    rename = "mod",
    subcommands("ban", "kick", "timeout", "untimeout", "history", "case"),
    subcommand_required,
    guild_only
)]
pub async fn moderation(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Ban a member from the server
#[poise::command(slash_command, guild_only, required_bot_permissions = "BAN_MEMBERS")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "Member to ban"] user: User,
    #[description = "Reason for the ban"]
    #[max_length = 512]
    reason: Option<String>,
    #[description = "Days of messages to delete (0-7)"]
    #[min = 0]
    #[max = 7]
    delete_messages: Option<u8>,
) -> Result<(), Error> {
    let action = ModerationAction::Ban {
        delete_message_days: delete_messages.unwrap_or(0).min(MAX_DELETE_MESSAGE_DAYS),
    };
    run_action(ctx, user, reason, action).await
}

/// Kick a member from the server
#[poise::command(slash_command, guild_only, required_bot_permissions = "KICK_MEMBERS")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "Member to kick"] user: User,
    #[description = "Reason for the kick"]
    #[max_length = 512]
    reason: Option<String>,
) -> Result<(), Error> {
    run_action(ctx, user, reason, ModerationAction::Kick).await
}

/// Time out a member
#[poise::command(slash_command, guild_only, required_bot_permissions = "MODERATE_MEMBERS")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "Member to time out"] user: User,
    #[description = "How long"]
    #[min = 1]
    #[max = 40320]
    amount: i64,
    #[description = "Unit of the duration"] unit: DurationUnit,
    #[description = "Reason for the timeout"]
    #[max_length = 512]
    reason: Option<String>,
) -> Result<(), Error> {
    run_action(ctx, user, reason, ModerationAction::Timeout { amount, unit }).await
}

/// Remove a member's timeout
#[poise::command(slash_command, guild_only, required_bot_permissions = "MODERATE_MEMBERS")]
pub async fn untimeout(
    ctx: Context<'_>,
    #[description = "Member whose timeout to remove"] user: User,
    #[description = "Reason for removing the timeout"]
    #[max_length = 512]
    reason: Option<String>,
) -> Result<(), Error> {
    run_action(ctx, user, reason, ModerationAction::Untimeout).await
}

/// Show recent punishments
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn history(
    ctx: Context<'_>,
    #[description = "Only show punishments for this member"] user: Option<User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let records = punishment::list_recent(
        &ctx.data().db,
        guild_id.get() as i64,
        user.as_ref().map(|u| u.id.get() as i64),
        HISTORY_PAGE_SIZE,
    )
    .await?;

    let title = match &user {
        Some(u) => format!("Punishment History: {}", u.tag()),
        None => "Punishment History".to_string(),
    };

    let embed = if records.is_empty() {
        embeds::standard_embed()
            .title(title)
            .description("No punishments recorded.")
    } else {
        let lines: Vec<String> = records.iter().map(notice::history_line).collect();
        embeds::standard_embed()
            .title(title)
            .description(embeds::bullet_list(&lines))
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Look up a punishment by its ID
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn case(
    ctx: Context<'_>,
    #[description = "Punishment ID"] id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let id = id.trim();

    let embed = match punishment::find(&ctx.data().db, guild_id.get() as i64, id).await? {
        Some(record) => notice::record_embed(&record),
        None => {
            warn!(guild_id = %guild_id, "No punishment with id {}", id);
            embeds::error_embed()
                .title("Case Not Found")
                .description(format!("No punishment with ID `{}` in this server.", id))
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
