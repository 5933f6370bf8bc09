use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, GuildId, Permissions, UserId};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::models::{ActionType, NewPunishment};
use crate::services::moderation::duration::{DurationUnit, TimeoutDuration};
use crate::services::moderation::error::ModerationError;
use crate::services::moderation::notice;
use crate::services::moderation::platform::ModerationPlatform;
use crate::services::moderation::store::ModerationStore;
use crate::utils::formatting::{reason_or_default, truncate};
use crate::utils::permissions::{outranks, permission_name};

/// Discord caps audit-log reasons at 512 characters
pub(crate) const AUDIT_REASON_LIMIT: usize = 512;

/// A user as shown in embeds and audit-log reasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub tag: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Ban { delete_message_days: u8 },
    Kick,
    Timeout { amount: i64, unit: DurationUnit },
    Untimeout,
}

impl ModerationAction {
    pub fn action_type(&self) -> ActionType {
        match self {
            ModerationAction::Ban { .. } => ActionType::Ban,
            ModerationAction::Kick => ActionType::Kick,
            ModerationAction::Timeout { .. } => ActionType::Timeout,
            ModerationAction::Untimeout => ActionType::Untimeout,
        }
    }

    /// Permission the invoking moderator must hold
    pub fn required_permission(&self) -> Permissions {
        match self {
            ModerationAction::Ban { .. } => Permissions::BAN_MEMBERS,
            ModerationAction::Kick => Permissions::KICK_MEMBERS,
            ModerationAction::Timeout { .. } | ModerationAction::Untimeout => {
                Permissions::MODERATE_MEMBERS
            }
        }
    }
}

/// One command invocation
#[derive(Debug, Clone)]
pub struct ModerationRequest {
    pub guild_id: GuildId,
    pub guild_name: String,
    pub moderator: UserSummary,
    pub target: UserSummary,
    pub reason: Option<String>,
    pub action: ModerationAction,
}

impl ModerationRequest {
    /// The given reason, or the placeholder when none was given
    pub fn reason(&self) -> &str {
        reason_or_default(self.reason.as_deref())
    }
}

/// Result of an enforced action
#[derive(Debug)]
pub struct ModerationOutcome {
    /// The ledger entry, written unless `logged` is false
    pub punishment: NewPunishment,
    pub expires_at: Option<DateTime<Utc>>,
    pub dm_delivered: bool,
    pub logged: bool,
    /// Channel the mod-log embed was posted to
    pub mod_log_channel: Option<ChannelId>,
    /// Non-fatal failures after enforcement
    pub warnings: Vec<ModerationError>,
}

/// An action that passed every precondition; only `authorize` builds one
#[derive(Debug, Clone, Copy)]
pub struct AuthorizedAction {
    plan: Plan,
}

#[derive(Debug, Clone, Copy)]
enum Plan {
    Ban { delete_message_days: u8 },
    Kick,
    Timeout(TimeoutDuration),
    Untimeout,
}

impl Plan {
    fn duration(&self) -> Option<TimeoutDuration> {
        match self {
            Plan::Timeout(duration) => Some(*duration),
            _ => None,
        }
    }
}

/// Runs a moderation action end to end: checks, DM, enforcement, ledger, mod log.
pub struct ModerationPipeline<'a, P, S> {
    platform: &'a P,
    store: &'a S,
}

impl<'a, P, S> ModerationPipeline<'a, P, S>
where
    P: ModerationPlatform,
    S: ModerationStore,
{
    pub fn new(platform: &'a P, store: &'a S) -> Self {
        Self { platform, store }
    }

    /// Precondition failures return `Err` before anything is changed.
    /// Once enforcement succeeds the result is always `Ok`; later failures
    /// land in `ModerationOutcome::warnings`.
    pub async fn run(&self, request: &ModerationRequest) -> Result<ModerationOutcome, ModerationError> {
        let authorized = self.authorize(request).await?;
        self.enforce(request, authorized).await
    }

    /// Run every precondition check without side effects
    pub async fn authorize(
        &self,
        request: &ModerationRequest,
    ) -> Result<AuthorizedAction, ModerationError> {
        let guild_id = request.guild_id;
        let verb = request.action.action_type().verb();

        // 1. Moderator permission
        let permission = request.action.required_permission();
        if !self
            .platform
            .has_permission(guild_id, request.moderator.id, permission)
            .await?
        {
            return Err(ModerationError::PermissionDenied(permission_name(permission)));
        }

        // 2. Target must be a guild member, and not someone off limits
        let target = self
            .platform
            .member(guild_id, request.target.id)
            .await?
            .ok_or(ModerationError::TargetNotFound(request.target.id))?;

        let bot_id = self.platform.bot_user_id();
        if target.user_id == request.moderator.id {
            return Err(ModerationError::InvalidTarget(format!("You cannot {} yourself!", verb)));
        }
        if target.user_id == bot_id {
            return Err(ModerationError::InvalidTarget(format!("I cannot {} myself!", verb)));
        }
        if self.platform.is_owner(guild_id, target.user_id).await? {
            return Err(ModerationError::InvalidTarget(format!(
                "You cannot {} the server owner!",
                verb
            )));
        }

        // 3. Role hierarchy, owner exempt
        let moderator_is_owner = self.platform.is_owner(guild_id, request.moderator.id).await?;
        let moderator_position = self
            .platform
            .role_position(guild_id, request.moderator.id)
            .await?;
        if !outranks(moderator_position, target.top_role_position, moderator_is_owner) {
            return Err(ModerationError::HierarchyViolation(verb));
        }

        // 4. Action-specific arguments
        let plan = match request.action {
            ModerationAction::Ban { delete_message_days } => Plan::Ban { delete_message_days },
            ModerationAction::Kick => Plan::Kick,
            ModerationAction::Timeout { amount, unit } => {
                Plan::Timeout(TimeoutDuration::new(amount, unit)?)
            }
            ModerationAction::Untimeout => {
                if !target.is_timed_out(Utc::now()) {
                    return Err(ModerationError::NotTimedOut);
                }
                Plan::Untimeout
            }
        };

        // 5. The bot itself must outrank the target
        let bot_position = self.platform.role_position(guild_id, bot_id).await?;
        if bot_position <= target.top_role_position {
            return Err(ModerationError::PlatformActionFailed(format!(
                "I cannot {} someone with a higher or equal role than me!",
                verb
            )));
        }

        Ok(AuthorizedAction { plan })
    }

    /// DM, enforce, record and post the mod log for an authorized action
    pub async fn enforce(
        &self,
        request: &ModerationRequest,
        authorized: AuthorizedAction,
    ) -> Result<ModerationOutcome, ModerationError> {
        let plan = authorized.plan;
        let guild_id = request.guild_id;
        let target_id = request.target.id;
        let action_type = request.action.action_type();
        let reason = request.reason().to_string();
        let punishment_id = Uuid::new_v4().to_string();
        let duration = plan.duration();
        let expires_at = duration.map(|d| Utc::now() + d.as_time_delta());
        let mut warnings = Vec::new();

        // DM first: once banned or kicked the user may no longer be reachable
        let dm = notice::dm_embed(request, &punishment_id, duration.as_ref(), expires_at);
        let dm_delivered = match self.platform.send_dm(target_id, dm).await {
            Ok(()) => true,
            Err(e) => {
                info!(
                    user_id = %target_id,
                    "Could not DM user about their {}: {}",
                    action_type, e
                );
                false
            }
        };

        let audit_reason = audit_reason(&punishment_id, &reason, action_type, &request.moderator.tag);
        let enforced = match (plan, expires_at) {
            (Plan::Ban { delete_message_days }, _) => {
                self.platform
                    .ban(guild_id, target_id, delete_message_days, &audit_reason)
                    .await
            }
            (Plan::Kick, _) => self.platform.kick(guild_id, target_id, &audit_reason).await,
            (Plan::Timeout(_), Some(until)) => {
                self.platform
                    .timeout(guild_id, target_id, until, &audit_reason)
                    .await
            }
            (Plan::Timeout(_), None) => Err(serenity::Error::Other("timeout without an end")),
            (Plan::Untimeout, _) => {
                self.platform
                    .remove_timeout(guild_id, target_id, &audit_reason)
                    .await
            }
        };

        if let Err(e) = enforced {
            error!(
                guild_id = %guild_id,
                user_id = %target_id,
                "Failed to {} user: {:?}",
                action_type.verb(),
                e
            );
            return Err(ModerationError::PlatformActionFailed(format!(
                "Failed to {} {}: {}",
                action_type.verb(),
                request.target.tag,
                e
            )));
        }

        info!(
            guild_id = %guild_id,
            user_id = %target_id,
            moderator_id = %request.moderator.id,
            punishment_id = %punishment_id,
            "{} applied",
            action_type
        );

        let entry = NewPunishment {
            punishment_id,
            guild_id: guild_id.get() as i64,
            user_id: target_id.get() as i64,
            moderator_id: request.moderator.id.get() as i64,
            action_type,
            reason,
            duration: duration.map(|d| d.label()),
        };

        let logged = match self.store.record_punishment(&entry).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    punishment_id = %entry.punishment_id,
                    "Failed to log punishment to database: {}",
                    e
                );
                warnings.push(ModerationError::PersistenceFailed(format!(
                    "Action succeeded but was not logged: {}",
                    e
                )));
                false
            }
        };

        let configured_channel = match self.store.guild_config(guild_id).await {
            Ok(config) => config.mod_log_channel(),
            Err(e) => {
                warn!(guild_id = %guild_id, "Could not load guild config: {}", e);
                warnings.push(ModerationError::PersistenceFailed(format!(
                    "Could not load the mod log settings: {}",
                    e
                )));
                None
            }
        };

        let mut mod_log_channel = None;
        match configured_channel {
            Some(channel_id) => {
                let embed = notice::mod_log_embed(request, &entry, expires_at);
                match self.platform.send_channel_message(channel_id, embed).await {
                    Ok(()) => {
                        info!(
                            guild_id = %guild_id,
                            punishment_id = %entry.punishment_id,
                            "Mod log sent"
                        );
                        mod_log_channel = Some(channel_id);
                    }
                    Err(e) => {
                        error!(
                            guild_id = %guild_id,
                            channel_id = %channel_id,
                            "Failed to send mod log: {}",
                            e
                        );
                        warnings.push(ModerationError::NotificationFailed(format!(
                            "the mod log entry to <#{}>",
                            channel_id
                        )));
                    }
                }
            }
            None => info!(guild_id = %guild_id, "No mod log channel configured"),
        }

        Ok(ModerationOutcome {
            punishment: entry,
            expires_at,
            dm_delivered,
            logged,
            mod_log_channel,
            warnings,
        })
    }
}

/// Reason recorded in the guild audit log, e.g. `[id] spam | Banned by mod`
fn audit_reason(punishment_id: &str, reason: &str, action_type: ActionType, moderator: &str) -> String {
    truncate(
        &format!(
            "[{}] {} | {} by {}",
            punishment_id,
            reason,
            action_type.done_by(),
            moderator
        ),
        AUDIT_REASON_LIMIT,
    )
}
