use serenity::all::{Context, GuildId, Permissions, UserId};

/// Role-hierarchy rule: the guild owner may act on anyone, everyone else
/// only on members whose highest role sits strictly below their own.
pub fn outranks(invoker_position: u16, target_position: u16, invoker_is_owner: bool) -> bool {
    invoker_is_owner || invoker_position > target_position
}

/// Check if a member has a specific permission (administrator implies all)
pub async fn has_permission(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
    permission: Permissions,
) -> Result<bool, serenity::Error> {
    let member = guild_id.member(ctx, user_id).await?;
    #[allow(deprecated)]
    let permissions = member.permissions(ctx)?;
    Ok(permissions.administrator() || permissions.contains(permission))
}

/// Position of the member's highest role, 0 when they only have @everyone
pub async fn highest_role_position(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<u16, serenity::Error> {
    let member = guild_id.member(ctx, user_id).await?;
    Ok(member
        .highest_role_info(ctx)
        .map(|(_, position)| position)
        .unwrap_or(0))
}

/// Owner of the guild, from cache when possible
pub async fn guild_owner_id(ctx: &Context, guild_id: GuildId) -> Result<UserId, serenity::Error> {
    let cached = guild_id.to_guild_cached(ctx).map(|guild| guild.owner_id);
    match cached {
        Some(owner_id) => Ok(owner_id),
        None => Ok(guild_id.to_partial_guild(ctx).await?.owner_id),
    }
}

/// Human-readable name of a permission, e.g. "Ban Members"
pub fn permission_name(permission: Permissions) -> String {
    permission.get_permission_names().join(", ")
}
