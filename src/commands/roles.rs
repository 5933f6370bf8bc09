use poise::serenity_prelude::{Role, RoleId, User};
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::bot::reply::send_private;
use crate::commands::user_summary;
use crate::constants::roles::{DEFAULT_ROLE_HISTORY_LIMIT, MAX_ROLE_HISTORY_LIMIT};
use crate::db::queries::{role_assignment, temp_role};
use crate::services::moderation::{DiscordPlatform, DurationUnit};
use crate::services::roles::notice;
use crate::services::roles::{
    RoleError, RoleManager, RolePlatform, RoleRequest, TempRoleDuration,
};
use crate::utils::formatting::reason_or_default;

enum Change {
    Add(Option<TempRoleDuration>),
    Remove,
}

async fn refuse(ctx: Context<'_>, error: &RoleError) -> Result<(), Error> {
    info!(
        guild_id = ?ctx.guild_id(),
        moderator_id = %ctx.author().id,
        command = %ctx.command().qualified_name,
        "Role change refused: {}",
        error
    );
    send_private(ctx, notice::failure_embed(error)).await?;
    Ok(())
}

/// Defer, apply the change and reply; refusals are only shown to the moderator
async fn run_change(
    ctx: Context<'_>,
    user: User,
    role: Role,
    reason: Option<String>,
    change: Change,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    ctx.defer().await?;

    let request = RoleRequest {
        guild_id,
        moderator: user_summary(ctx.author()),
        target: user_summary(&user),
        role_id: role.id,
        reason,
    };

    let platform = DiscordPlatform::new(ctx.serenity_context());
    let manager = RoleManager::new(&platform, &ctx.data().db);

    let result = match change {
        Change::Add(duration) => manager.assign(&request, duration).await,
        Change::Remove => manager.revoke(&request).await,
    };

    match result {
        Ok(change) => {
            let embed = notice::change_embed(&request, &change);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => refuse(ctx, &e).await?,
    }

    Ok(())
}

/// Role management commands
#[poise::command(
    slash_command,
    rename = "role",
    subcommands("add", "remove", "temp", "list", "templist", "history", "removeall"),
    subcommand_required,
    guild_only
)]
pub async fn roles(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add a role to a member
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_ROLES",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "The member to give the role to"] member: User,
    #[description = "The role to give"] role: Role,
    #[description = "Reason for adding the role"]
    #[max_length = 512]
    reason: Option<String>,
) -> Result<(), Error> {
    run_change(ctx, member, role, reason, Change::Add(None)).await
}

/// Remove a role from a member
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_ROLES",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "The member to remove the role from"] member: User,
    #[description = "The role to remove"] role: Role,
    #[description = "Reason for removing the role"]
    #[max_length = 512]
    reason: Option<String>,
) -> Result<(), Error> {
    run_change(ctx, member, role, reason, Change::Remove).await
}

/// Give a role to a member temporarily
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_ROLES",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn temp(
    ctx: Context<'_>,
    #[description = "The member to give the role to"] member: User,
    #[description = "The role to give"] role: Role,
    #[description = "Duration value"]
    #[min = 1]
    #[max = 365]
    duration: i64,
    #[description = "Time unit"] unit: DurationUnit,
    #[description = "Reason for adding the temporary role"]
    #[max_length = 512]
    reason: Option<String>,
) -> Result<(), Error> {
    let duration = match TempRoleDuration::new(duration, unit) {
        Ok(duration) => duration,
        Err(e) => return refuse(ctx, &e).await,
    };
    run_change(ctx, member, role, reason, Change::Add(Some(duration))).await
}

/// List all roles a member has
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn list(
    ctx: Context<'_>,
    #[description = "The member to list roles for (defaults to you)"] member: Option<User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let user = member.unwrap_or_else(|| ctx.author().clone());
    ctx.defer().await?;

    let platform = DiscordPlatform::new(ctx.serenity_context());
    let manager = RoleManager::new(&platform, &ctx.data().db);

    let roles = match manager.roles_of(guild_id, user.id).await {
        Ok(roles) => roles,
        Err(e) => return refuse(ctx, &e).await,
    };
    let temp_roles =
        temp_role::list_for_member(&ctx.data().db, guild_id.get() as i64, user.id.get() as i64)
            .await?;

    let embed = notice::role_list_embed(&user_summary(&user), &roles, &temp_roles);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// List all temporary roles for a member
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn templist(
    ctx: Context<'_>,
    #[description = "The member to list temporary roles for (defaults to you)"]
    member: Option<User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let user = member.unwrap_or_else(|| ctx.author().clone());
    ctx.defer().await?;

    let rows =
        temp_role::list_for_member(&ctx.data().db, guild_id.get() as i64, user.id.get() as i64)
            .await?;

    let platform = DiscordPlatform::new(ctx.serenity_context());
    let mut resolved = Vec::with_capacity(rows.len());
    for row in rows {
        let Ok(role_id) = u64::try_from(row.role_id).map(RoleId::new) else {
            continue;
        };
        // Rows for deleted roles are left for the sweeper to drop
        if let Some(role) = platform.role(guild_id, role_id).await? {
            resolved.push((row, role));
        }
    }

    let embed = notice::temp_roles_embed(&user_summary(&user), &resolved);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// View role assignment history for a member
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn history(
    ctx: Context<'_>,
    #[description = "The member to view history for"] member: User,
    #[description = "Number of entries to show (1-25)"]
    #[min = 1]
    #[max = 25]
    limit: Option<i64>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    ctx.defer().await?;

    let limit = limit
        .unwrap_or(DEFAULT_ROLE_HISTORY_LIMIT)
        .clamp(1, MAX_ROLE_HISTORY_LIMIT);
    let records = role_assignment::list_for_member(
        &ctx.data().db,
        guild_id.get() as i64,
        member.id.get() as i64,
        limit,
    )
    .await?;

    let embed = notice::history_embed(&user_summary(&member), &records);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Remove all roles from a member
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn removeall(
    ctx: Context<'_>,
    #[description = "The member to remove all roles from"] member: User,
    #[description = "Reason for removing all roles"]
    #[max_length = 512]
    reason: Option<String>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    ctx.defer().await?;

    let moderator = user_summary(ctx.author());
    let target = user_summary(&member);
    let reason = reason_or_default(reason.as_deref());

    let platform = DiscordPlatform::new(ctx.serenity_context());
    let manager = RoleManager::new(&platform, &ctx.data().db);

    match manager.revoke_all(guild_id, &moderator, &target, reason).await {
        Ok(removal) => {
            let embed = notice::bulk_removal_embed(&moderator, &target, &removal, reason);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => refuse(ctx, &e).await?,
    }

    Ok(())
}
