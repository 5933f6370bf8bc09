use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serenity::all::{GuildId, Permissions, RoleId, UserId};
use tracing::{error, info, warn};

use crate::db::models::{NewRoleAssignment, NewTempRole, RoleAction, TempRole};
use crate::services::moderation::pipeline::AUDIT_REASON_LIMIT;
use crate::services::moderation::UserSummary;
use crate::services::roles::duration::TempRoleDuration;
use crate::services::roles::error::RoleError;
use crate::services::roles::platform::{RoleInfo, RolePlatform};
use crate::services::roles::store::RoleStore;
use crate::utils::formatting::{reason_or_default, truncate};
use crate::utils::permissions::{outranks, permission_name};

/// Audit-log reason and ledger reason for roles removed by the sweeper
pub const EXPIRED_REASON: &str = "Temporary role expired";

/// One `/role add`, `/role temp` or `/role remove` invocation
#[derive(Debug, Clone)]
pub struct RoleRequest {
    pub guild_id: GuildId,
    pub moderator: UserSummary,
    pub target: UserSummary,
    pub role_id: RoleId,
    pub reason: Option<String>,
}

impl RoleRequest {
    pub fn reason(&self) -> &str {
        reason_or_default(self.reason.as_deref())
    }
}

/// A role that was granted or removed
#[derive(Debug)]
pub struct RoleChange {
    pub role: RoleInfo,
    pub action: RoleAction,
    /// Label of a temporary grant, e.g. "3 days"
    pub duration: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub logged: bool,
    pub warnings: Vec<RoleError>,
}

/// Result of `/role removeall`, highest roles first
#[derive(Debug)]
pub struct BulkRemoval {
    pub removed: Vec<RoleInfo>,
    /// Roles the bot or the moderator is not allowed to touch
    pub skipped: Vec<RoleInfo>,
    pub warnings: Vec<RoleError>,
}

/// What one expiry sweep did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    /// Rows dropped because the member, the role or the grant was already gone
    pub discarded: usize,
    /// Rows kept for the next sweep after a platform error
    pub retained: usize,
}

enum Expiry {
    Removed,
    Stale,
}

/// Grants, removes and expires roles with the same hierarchy rules as moderation
pub struct RoleManager<'a, P, S> {
    platform: &'a P,
    store: &'a S,
}

impl<'a, P, S> RoleManager<'a, P, S>
where
    P: RolePlatform,
    S: RoleStore,
{
    pub fn new(platform: &'a P, store: &'a S) -> Self {
        Self { platform, store }
    }

    /// Grant a role, permanently or until `duration` has passed
    pub async fn assign(
        &self,
        request: &RoleRequest,
        duration: Option<TempRoleDuration>,
    ) -> Result<RoleChange, RoleError> {
        let guild_id = request.guild_id;
        let target_id = request.target.id;

        let (role, held) = self.resolve(request, "assign").await?;
        if held {
            return Err(RoleError::AlreadyHasRole {
                user: target_id,
                role: role.id,
            });
        }
        self.check_hierarchy(guild_id, request.moderator.id, &role, "assign")
            .await?;

        let reason = request.reason().to_string();
        let label = duration.map(|d| d.label());
        let expires_at = duration.map(|d| Utc::now() + d.as_time_delta());

        // Stored before granting so a temporary role never outlives a failed write
        if let Some(expires_at) = expires_at {
            let entry = NewTempRole {
                guild_id: guild_id.get() as i64,
                user_id: target_id.get() as i64,
                role_id: role.id.get() as i64,
                added_by: request.moderator.id.get() as i64,
                expires_at,
                reason: reason.clone(),
            };
            if let Err(e) = self.store.save_temp_role(&entry).await {
                error!(guild_id = %guild_id, user_id = %target_id, "Failed to save temp role: {}", e);
                return Err(RoleError::ExpiryNotSaved(e.to_string()));
            }
        }

        let audit_reason = match &label {
            Some(label) => format!(
                "Temporary role for {}: {} | Added by {}",
                label, reason, request.moderator.tag
            ),
            None => format!("{} | Added by {}", reason, request.moderator.tag),
        };

        if let Err(e) = self
            .platform
            .add_role(guild_id, target_id, role.id, &truncate(&audit_reason, AUDIT_REASON_LIMIT))
            .await
        {
            error!(
                guild_id = %guild_id,
                user_id = %target_id,
                role_id = %role.id,
                "Failed to add role: {:?}",
                e
            );
            if expires_at.is_some() {
                if let Err(e) = self.store.clear_temp_role(guild_id, target_id, role.id).await {
                    warn!(role_id = %role.id, "Could not clear temp role after failed grant: {}", e);
                }
            }
            return Err(RoleError::PlatformActionFailed(format!("Failed to add role: {}", e)));
        }

        info!(
            guild_id = %guild_id,
            user_id = %target_id,
            moderator_id = %request.moderator.id,
            role_id = %role.id,
            duration = ?label,
            "Role {} added",
            role.name
        );

        let mut warnings = Vec::new();
        let entry = NewRoleAssignment {
            guild_id: guild_id.get() as i64,
            user_id: target_id.get() as i64,
            role_id: role.id.get() as i64,
            moderator_id: request.moderator.id.get() as i64,
            action: RoleAction::Add,
            reason,
            duration: label.clone(),
        };
        let logged = self.record(&entry, &mut warnings).await;

        Ok(RoleChange {
            role,
            action: RoleAction::Add,
            duration: label,
            expires_at,
            logged,
            warnings,
        })
    }

    /// Remove a role and stop tracking any expiry it had
    pub async fn revoke(&self, request: &RoleRequest) -> Result<RoleChange, RoleError> {
        let guild_id = request.guild_id;
        let target_id = request.target.id;

        let (role, held) = self.resolve(request, "remove").await?;
        if !held {
            return Err(RoleError::MissingRole {
                user: target_id,
                role: role.id,
            });
        }
        self.check_hierarchy(guild_id, request.moderator.id, &role, "remove")
            .await?;

        let reason = request.reason().to_string();
        let audit_reason = format!("{} | Removed by {}", reason, request.moderator.tag);

        if let Err(e) = self
            .platform
            .remove_role(guild_id, target_id, role.id, &truncate(&audit_reason, AUDIT_REASON_LIMIT))
            .await
        {
            error!(
                guild_id = %guild_id,
                user_id = %target_id,
                role_id = %role.id,
                "Failed to remove role: {:?}",
                e
            );
            return Err(RoleError::PlatformActionFailed(format!("Failed to remove role: {}", e)));
        }

        info!(
            guild_id = %guild_id,
            user_id = %target_id,
            moderator_id = %request.moderator.id,
            role_id = %role.id,
            "Role {} removed",
            role.name
        );

        let mut warnings = Vec::new();
        self.forget_expiry(guild_id, target_id, role.id, &mut warnings)
            .await;

        let entry = NewRoleAssignment {
            guild_id: guild_id.get() as i64,
            user_id: target_id.get() as i64,
            role_id: role.id.get() as i64,
            moderator_id: request.moderator.id.get() as i64,
            action: RoleAction::Remove,
            reason,
            duration: None,
        };
        let logged = self.record(&entry, &mut warnings).await;

        Ok(RoleChange {
            role,
            action: RoleAction::Remove,
            duration: None,
            expires_at: None,
            logged,
            warnings,
        })
    }

    /// Strip every role the bot and the moderator may touch; the rest are reported as skipped
    pub async fn revoke_all(
        &self,
        guild_id: GuildId,
        moderator: &UserSummary,
        target: &UserSummary,
        reason: &str,
    ) -> Result<BulkRemoval, RoleError> {
        self.require(guild_id, moderator.id, Permissions::ADMINISTRATOR)
            .await?;

        let roles = self.roles_of(guild_id, target.id).await?;
        if roles.is_empty() {
            return Err(RoleError::NoRoles(target.id));
        }
        let held: Vec<RoleId> = roles.iter().map(|role| role.id).collect();

        let bot_position = self
            .platform
            .role_position(guild_id, self.platform.bot_user_id())
            .await?;
        let moderator_is_owner = self.platform.is_owner(guild_id, moderator.id).await?;
        let moderator_position = self.platform.role_position(guild_id, moderator.id).await?;

        let (removed, skipped): (Vec<RoleInfo>, Vec<RoleInfo>) =
            roles.into_iter().partition(|role| {
                !role.managed
                    && bot_position > role.position
                    && outranks(moderator_position, role.position, moderator_is_owner)
            });
        if removed.is_empty() {
            return Err(RoleError::NothingRemovable);
        }

        let kept: Vec<RoleId> = held
            .into_iter()
            .filter(|id| !removed.iter().any(|role| role.id == *id))
            .collect();
        let audit_reason = format!("{} | Removed by {}", reason, moderator.tag);

        if let Err(e) = self
            .platform
            .set_roles(guild_id, target.id, &kept, &truncate(&audit_reason, AUDIT_REASON_LIMIT))
            .await
        {
            error!(guild_id = %guild_id, user_id = %target.id, "Failed to remove roles: {:?}", e);
            return Err(RoleError::PlatformActionFailed(format!("Failed to remove roles: {}", e)));
        }

        info!(
            guild_id = %guild_id,
            user_id = %target.id,
            moderator_id = %moderator.id,
            removed = removed.len(),
            skipped = skipped.len(),
            "Removed all roles"
        );

        let mut warnings = Vec::new();
        for role in &removed {
            self.forget_expiry(guild_id, target.id, role.id, &mut warnings)
                .await;
            let entry = NewRoleAssignment {
                guild_id: guild_id.get() as i64,
                user_id: target.id.get() as i64,
                role_id: role.id.get() as i64,
                moderator_id: moderator.id.get() as i64,
                action: RoleAction::Remove,
                reason: reason.to_string(),
                duration: None,
            };
            self.record(&entry, &mut warnings).await;
        }
        // The same failure repeats for every role; report it once
        let mut seen = HashSet::new();
        warnings.retain(|warning| seen.insert(warning.to_string()));

        Ok(BulkRemoval {
            removed,
            skipped,
            warnings,
        })
    }

    /// The member's roles, highest first, without `@everyone`
    pub async fn roles_of(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<RoleInfo>, RoleError> {
        let held = self
            .platform
            .member_roles(guild_id, user_id)
            .await?
            .ok_or(RoleError::TargetNotFound(user_id))?;

        let mut roles = Vec::with_capacity(held.len());
        for role_id in held {
            if let Some(role) = self.platform.role(guild_id, role_id).await? {
                if !role.is_everyone(guild_id) {
                    roles.push(role);
                }
            }
        }
        roles.sort_by(|a, b| b.position.cmp(&a.position));
        Ok(roles)
    }

    /// Remove every temporary role that expired at or before `now`.
    /// Rows whose member, role or grant is already gone are dropped; rows that
    /// hit a platform error stay for the next sweep.
    pub async fn expire_due(&self, now: DateTime<Utc>) -> Result<SweepReport, sqlx::Error> {
        let mut report = SweepReport::default();

        for row in self.store.expired_temp_roles(now).await? {
            match self.expire(&row).await {
                Ok(expiry) => {
                    if let Err(e) = self.store.delete_temp_role(row.id).await {
                        warn!(temp_role_id = row.id, "Failed to delete temp role row: {}", e);
                    }
                    match expiry {
                        Expiry::Removed => report.removed += 1,
                        Expiry::Stale => report.discarded += 1,
                    }
                }
                Err(e) => {
                    warn!(
                        temp_role_id = row.id,
                        guild_id = row.guild_id,
                        "Could not remove expired role, retrying next sweep: {:?}",
                        e
                    );
                    report.retained += 1;
                }
            }
        }

        Ok(report)
    }

    async fn expire(&self, row: &TempRole) -> Result<Expiry, serenity::Error> {
        let Some((guild_id, user_id, role_id)) = row.ids() else {
            return Ok(Expiry::Stale);
        };
        let Some(held) = self.platform.member_roles(guild_id, user_id).await? else {
            return Ok(Expiry::Stale);
        };
        // Removed by hand, or the role itself was deleted
        if !held.contains(&role_id) {
            return Ok(Expiry::Stale);
        }

        self.platform
            .remove_role(guild_id, user_id, role_id, EXPIRED_REASON)
            .await?;
        info!(
            guild_id = %guild_id,
            user_id = %user_id,
            role_id = %role_id,
            "Removed expired temporary role"
        );

        let entry = NewRoleAssignment {
            guild_id: row.guild_id,
            user_id: row.user_id,
            role_id: row.role_id,
            moderator_id: self.platform.bot_user_id().get() as i64,
            action: RoleAction::Remove,
            reason: EXPIRED_REASON.to_string(),
            duration: None,
        };
        if let Err(e) = self.store.record_assignment(&entry).await {
            warn!(temp_role_id = row.id, "Failed to log role expiry: {}", e);
        }

        Ok(Expiry::Removed)
    }

    async fn require(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        permission: Permissions,
    ) -> Result<(), RoleError> {
        if !self
            .platform
            .has_permission(guild_id, user_id, permission)
            .await?
        {
            return Err(RoleError::PermissionDenied(permission_name(permission)));
        }
        Ok(())
    }

    /// Permission, member and role checks shared by assign and revoke.
    /// Returns the role and whether the member already holds it.
    async fn resolve(&self, request: &RoleRequest, verb: &'static str) -> Result<(RoleInfo, bool), RoleError> {
        let guild_id = request.guild_id;
        self.require(guild_id, request.moderator.id, Permissions::MANAGE_ROLES)
            .await?;

        let held = self
            .platform
            .member_roles(guild_id, request.target.id)
            .await?
            .ok_or(RoleError::TargetNotFound(request.target.id))?;
        let role = self
            .platform
            .role(guild_id, request.role_id)
            .await?
            .ok_or(RoleError::RoleNotFound(request.role_id))?;

        if role.is_everyone(guild_id) {
            return Err(RoleError::EveryoneRole(verb));
        }
        if role.managed {
            return Err(RoleError::ManagedRole(role.id));
        }

        let has_role = held.contains(&role.id);
        Ok((role, has_role))
    }

    /// Both the bot and the moderator must sit above the role; the owner is exempt
    async fn check_hierarchy(
        &self,
        guild_id: GuildId,
        moderator_id: UserId,
        role: &RoleInfo,
        verb: &'static str,
    ) -> Result<(), RoleError> {
        let bot_position = self
            .platform
            .role_position(guild_id, self.platform.bot_user_id())
            .await?;
        if bot_position <= role.position {
            return Err(RoleError::BotOutranked { verb, role: role.id });
        }

        let is_owner = self.platform.is_owner(guild_id, moderator_id).await?;
        let position = self.platform.role_position(guild_id, moderator_id).await?;
        if !outranks(position, role.position, is_owner) {
            return Err(RoleError::ModeratorOutranked { verb, role: role.id });
        }
        Ok(())
    }

    async fn forget_expiry(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        warnings: &mut Vec<RoleError>,
    ) {
        if let Err(e) = self.store.clear_temp_role(guild_id, user_id, role_id).await {
            error!(role_id = %role_id, "Failed to clear temp role: {}", e);
            warnings.push(RoleError::PersistenceFailed(format!(
                "The role's expiry could not be cleared: {}",
                e
            )));
        }
    }

    async fn record(&self, entry: &NewRoleAssignment, warnings: &mut Vec<RoleError>) -> bool {
        match self.store.record_assignment(entry).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    guild_id = entry.guild_id,
                    user_id = entry.user_id,
                    "Failed to log role change to database: {}",
                    e
                );
                warnings.push(RoleError::PersistenceFailed(format!(
                    "Role change succeeded but was not logged: {}",
                    e
                )));
                false
            }
        }
    }
}
