use serenity::all::{EditMember, GuildId, Role, RoleId, UserId};

use crate::services::moderation::platform::is_not_found;
use crate::services::moderation::{DiscordPlatform, ModerationPlatform};

/// What the role manager needs to know about a guild role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
    pub position: u16,
    /// Bot, booster and integration roles cannot be granted or removed by hand
    pub managed: bool,
}

impl RoleInfo {
    /// The `@everyone` role shares the guild's id
    pub fn is_everyone(&self, guild_id: GuildId) -> bool {
        self.id.get() == guild_id.get()
    }
}

impl From<&Role> for RoleInfo {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
            position: role.position,
            managed: role.managed,
        }
    }
}

/// Role operations on top of the moderation platform
#[serenity::async_trait]
pub trait RolePlatform: ModerationPlatform {
    /// The member's role ids, `@everyone` excluded; `Ok(None)` when not in the guild
    async fn member_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Vec<RoleId>>, serenity::Error>;

    async fn role(&self, guild_id: GuildId, role_id: RoleId) -> Result<Option<RoleInfo>, serenity::Error>;

    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), serenity::Error>;

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), serenity::Error>;

    /// Replace the member's role set with `kept` in one request
    async fn set_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        kept: &[RoleId],
        reason: &str,
    ) -> Result<(), serenity::Error>;
}

#[serenity::async_trait]
impl RolePlatform for DiscordPlatform<'_> {
    async fn member_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Vec<RoleId>>, serenity::Error> {
        match guild_id.member(self.ctx(), user_id).await {
            Ok(member) => Ok(Some(member.roles)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn role(&self, guild_id: GuildId, role_id: RoleId) -> Result<Option<RoleInfo>, serenity::Error> {
        let cached = self
            .ctx()
            .cache
            .guild(guild_id)
            .map(|guild| guild.roles.get(&role_id).map(RoleInfo::from));
        if let Some(role) = cached {
            return Ok(role);
        }

        let roles = guild_id.roles(self.ctx()).await?;
        Ok(roles.get(&role_id).map(RoleInfo::from))
    }

    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.ctx()
            .http
            .add_member_role(guild_id, user_id, role_id, Some(reason))
            .await
    }

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.ctx()
            .http
            .remove_member_role(guild_id, user_id, role_id, Some(reason))
            .await
    }

    async fn set_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        kept: &[RoleId],
        reason: &str,
    ) -> Result<(), serenity::Error> {
        let edit = EditMember::new()
            .roles(kept.iter().copied())
            .audit_log_reason(reason);

        guild_id.edit_member(self.ctx(), user_id, edit).await?;
        Ok(())
    }
}
