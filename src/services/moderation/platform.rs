use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, Context, CreateEmbed, CreateMessage, EditMember, GuildId, Permissions, Timestamp,
    UserId,
};
use serenity::http::HttpError;

use crate::utils::permissions;

/// What the pipeline needs to know about the member being acted on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMember {
    pub user_id: UserId,
    pub top_role_position: u16,
    pub timed_out_until: Option<DateTime<Utc>>,
}

impl TargetMember {
    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        self.timed_out_until.is_some_and(|until| until > now)
    }
}

/// The chat-platform operations the moderation pipeline depends on
#[serenity::async_trait]
pub trait ModerationPlatform: Send + Sync {
    fn bot_user_id(&self) -> UserId;

    /// Resolve a guild member; `Ok(None)` when the user is not in the guild
    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<TargetMember>, serenity::Error>;

    async fn has_permission(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        permission: Permissions,
    ) -> Result<bool, serenity::Error>;

    async fn role_position(&self, guild_id: GuildId, user_id: UserId) -> Result<u16, serenity::Error>;

    async fn is_owner(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, serenity::Error>;

    async fn ban(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<(), serenity::Error>;

    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> Result<(), serenity::Error>;

    async fn timeout(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), serenity::Error>;

    async fn remove_timeout(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> Result<(), serenity::Error>;

    async fn send_dm(&self, user_id: UserId, embed: CreateEmbed) -> Result<(), serenity::Error>;

    async fn send_channel_message(
        &self,
        channel_id: ChannelId,
        embed: CreateEmbed,
    ) -> Result<(), serenity::Error>;
}

/// Serenity-backed platform used by the slash commands
pub struct DiscordPlatform<'a> {
    ctx: &'a Context,
}

impl<'a> DiscordPlatform<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &'a Context {
        self.ctx
    }
}

pub(crate) fn is_not_found(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

#[serenity::async_trait]
impl ModerationPlatform for DiscordPlatform<'_> {
    fn bot_user_id(&self) -> UserId {
        self.ctx.cache.current_user().id
    }

    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<TargetMember>, serenity::Error> {
        let member = match guild_id.member(self.ctx, user_id).await {
            Ok(member) => member,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(e),
        };

        let top_role_position = member
            .highest_role_info(self.ctx)
            .map(|(_, position)| position)
            .unwrap_or(0);
        let timed_out_until = member
            .communication_disabled_until
            .and_then(|ts| DateTime::from_timestamp(ts.unix_timestamp(), 0));

        Ok(Some(TargetMember {
            user_id,
            top_role_position,
            timed_out_until,
        }))
    }

    async fn has_permission(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        permission: Permissions,
    ) -> Result<bool, serenity::Error> {
        permissions::has_permission(self.ctx, guild_id, user_id, permission).await
    }

    async fn role_position(&self, guild_id: GuildId, user_id: UserId) -> Result<u16, serenity::Error> {
        permissions::highest_role_position(self.ctx, guild_id, user_id).await
    }

    async fn is_owner(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, serenity::Error> {
        Ok(permissions::guild_owner_id(self.ctx, guild_id).await? == user_id)
    }

    async fn ban(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        guild_id
            .ban_with_reason(self.ctx, user_id, delete_message_days, reason)
            .await
    }

    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> Result<(), serenity::Error> {
        guild_id.kick_with_reason(self.ctx, user_id, reason).await
    }

    async fn timeout(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        let until = Timestamp::from_unix_timestamp(until.timestamp())
            .map_err(|_| serenity::Error::Other("timeout end is out of range"))?;
        let edit = EditMember::new()
            .disable_communication_until_datetime(until)
            .audit_log_reason(reason);

        guild_id.edit_member(self.ctx, user_id, edit).await?;
        Ok(())
    }

    async fn remove_timeout(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        let edit = EditMember::new().enable_communication().audit_log_reason(reason);

        guild_id.edit_member(self.ctx, user_id, edit).await?;
        Ok(())
    }

    async fn send_dm(&self, user_id: UserId, embed: CreateEmbed) -> Result<(), serenity::Error> {
        user_id
            .direct_message(self.ctx, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel_id: ChannelId,
        embed: CreateEmbed,
    ) -> Result<(), serenity::Error> {
        channel_id
            .send_message(self.ctx, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}
