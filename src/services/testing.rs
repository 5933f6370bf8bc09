//! In-memory fakes for exercising the moderation pipeline and the role manager
//! without Discord or MySQL.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, CreateEmbed, GuildId, Permissions, RoleId, UserId};

use crate::db::models::{GuildConfig, NewPunishment, NewRoleAssignment, NewTempRole, TempRole};
use crate::services::moderation::platform::{ModerationPlatform, TargetMember};
use crate::services::moderation::store::ModerationStore;
use crate::services::roles::{RoleInfo, RolePlatform, RoleStore};

pub const GUILD: GuildId = GuildId::new(100);
pub const MODERATOR: UserId = UserId::new(200);
pub const TARGET: UserId = UserId::new(300);
pub const BOT: UserId = UserId::new(400);
pub const OWNER: UserId = UserId::new(500);
pub const LOG_CHANNEL: ChannelId = ChannelId::new(600);

/// Shares the guild's id
pub const EVERYONE: RoleId = RoleId::new(100);
/// Position 2, below the moderator
pub const LOW_ROLE: RoleId = RoleId::new(700);
/// Position 7, above the moderator and below the bot
pub const MID_ROLE: RoleId = RoleId::new(701);
/// Position 12, above the bot
pub const HIGH_ROLE: RoleId = RoleId::new(702);
/// Position 3, owned by an integration
pub const MANAGED_ROLE: RoleId = RoleId::new(703);

/// A mutating call made against the platform
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Dm {
        user_id: UserId,
    },
    Ban {
        user_id: UserId,
        delete_message_days: u8,
        reason: String,
    },
    Kick {
        user_id: UserId,
        reason: String,
    },
    Timeout {
        user_id: UserId,
        until: DateTime<Utc>,
        reason: String,
    },
    RemoveTimeout {
        user_id: UserId,
        reason: String,
    },
    ChannelMessage {
        channel_id: ChannelId,
    },
    AddRole {
        user_id: UserId,
        role_id: RoleId,
        reason: String,
    },
    RemoveRole {
        user_id: UserId,
        role_id: RoleId,
        reason: String,
    },
    SetRoles {
        user_id: UserId,
        kept: Vec<RoleId>,
        reason: String,
    },
}

fn role(id: RoleId, name: &str, position: u16, managed: bool) -> RoleInfo {
    RoleInfo {
        id,
        name: name.to_string(),
        position,
        managed,
    }
}

pub struct FakePlatform {
    members: HashMap<UserId, TargetMember>,
    positions: HashMap<UserId, u16>,
    denied: HashSet<UserId>,
    owner: UserId,
    fail_dm: bool,
    fail_enforcement: bool,
    fail_channel: bool,
    roles: HashMap<RoleId, RoleInfo>,
    member_roles: HashMap<UserId, Vec<RoleId>>,
    calls: Mutex<Vec<Call>>,
}

impl FakePlatform {
    /// Moderator at position 5, bot at 10, target a plain member at 1
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            positions: HashMap::from([(MODERATOR, 5), (BOT, 10), (TARGET, 1)]),
            denied: HashSet::new(),
            owner: OWNER,
            fail_dm: false,
            fail_enforcement: false,
            fail_channel: false,
            roles: [
                role(EVERYONE, "@everyone", 0, false),
                role(LOW_ROLE, "Member", 2, false),
                role(MID_ROLE, "Helper", 7, false),
                role(HIGH_ROLE, "Admin", 12, false),
                role(MANAGED_ROLE, "Server Booster", 3, true),
            ]
            .into_iter()
            .map(|info| (info.id, info))
            .collect(),
            member_roles: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
        .with_member(TARGET, 1)
    }

    pub fn with_member(mut self, user_id: UserId, position: u16) -> Self {
        self.members.insert(
            user_id,
            TargetMember {
                user_id,
                top_role_position: position,
                timed_out_until: None,
            },
        );
        self
    }

    pub fn with_position(mut self, user_id: UserId, position: u16) -> Self {
        self.positions.insert(user_id, position);
        self
    }

    pub fn with_target_position(self, position: u16) -> Self {
        self.with_member(TARGET, position).with_position(TARGET, position)
    }

    pub fn with_target_timed_out(mut self, until: DateTime<Utc>) -> Self {
        if let Some(member) = self.members.get_mut(&TARGET) {
            member.timed_out_until = Some(until);
        }
        self
    }

    pub fn without_target(mut self) -> Self {
        self.members.remove(&TARGET);
        self
    }

    pub fn without_permissions(mut self, user_id: UserId) -> Self {
        self.denied.insert(user_id);
        self
    }

    pub fn with_owner(mut self, user_id: UserId) -> Self {
        self.owner = user_id;
        self
    }

    pub fn failing_dms(mut self) -> Self {
        self.fail_dm = true;
        self
    }

    pub fn failing_enforcement(mut self) -> Self {
        self.fail_enforcement = true;
        self
    }

    pub fn failing_channel_messages(mut self) -> Self {
        self.fail_channel = true;
        self
    }

    /// Roles held by a member; the member must also be known via `with_member`
    pub fn with_member_roles(mut self, user_id: UserId, roles: &[RoleId]) -> Self {
        self.member_roles.insert(user_id, roles.to_vec());
        self
    }

    pub fn without_role(mut self, role_id: RoleId) -> Self {
        self.roles.remove(&role_id);
        self
    }

    pub fn side_effects(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn enforce(&self, call: Call) -> Result<(), serenity::Error> {
        if self.fail_enforcement {
            return Err(serenity::Error::Other("Missing Permissions"));
        }
        self.push(call);
        Ok(())
    }
}

#[serenity::async_trait]
impl ModerationPlatform for FakePlatform {
    fn bot_user_id(&self) -> UserId {
        BOT
    }

    async fn member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<TargetMember>, serenity::Error> {
        Ok(self.members.get(&user_id).cloned())
    }

    async fn has_permission(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        _permission: Permissions,
    ) -> Result<bool, serenity::Error> {
        Ok(!self.denied.contains(&user_id))
    }

    async fn role_position(&self, _guild_id: GuildId, user_id: UserId) -> Result<u16, serenity::Error> {
        Ok(self.positions.get(&user_id).copied().unwrap_or(0))
    }

    async fn is_owner(&self, _guild_id: GuildId, user_id: UserId) -> Result<bool, serenity::Error> {
        Ok(user_id == self.owner)
    }

    async fn ban(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.enforce(Call::Ban {
            user_id,
            delete_message_days,
            reason: reason.to_string(),
        })
    }

    async fn kick(&self, _guild_id: GuildId, user_id: UserId, reason: &str) -> Result<(), serenity::Error> {
        self.enforce(Call::Kick {
            user_id,
            reason: reason.to_string(),
        })
    }

    async fn timeout(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.enforce(Call::Timeout {
            user_id,
            until,
            reason: reason.to_string(),
        })
    }

    async fn remove_timeout(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.enforce(Call::RemoveTimeout {
            user_id,
            reason: reason.to_string(),
        })
    }

    async fn send_dm(&self, user_id: UserId, _embed: CreateEmbed) -> Result<(), serenity::Error> {
        if self.fail_dm {
            return Err(serenity::Error::Other("Cannot send messages to this user"));
        }
        self.push(Call::Dm { user_id });
        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel_id: ChannelId,
        _embed: CreateEmbed,
    ) -> Result<(), serenity::Error> {
        if self.fail_channel {
            return Err(serenity::Error::Other("Unknown Channel"));
        }
        self.push(Call::ChannelMessage { channel_id });
        Ok(())
    }
}

#[serenity::async_trait]
impl RolePlatform for FakePlatform {
    async fn member_roles(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Vec<RoleId>>, serenity::Error> {
        if !self.members.contains_key(&user_id) {
            return Ok(None);
        }
        Ok(Some(self.member_roles.get(&user_id).cloned().unwrap_or_default()))
    }

    async fn role(&self, _guild_id: GuildId, role_id: RoleId) -> Result<Option<RoleInfo>, serenity::Error> {
        Ok(self.roles.get(&role_id).cloned())
    }

    async fn add_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.enforce(Call::AddRole {
            user_id,
            role_id,
            reason: reason.to_string(),
        })
    }

    async fn remove_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.enforce(Call::RemoveRole {
            user_id,
            role_id,
            reason: reason.to_string(),
        })
    }

    async fn set_roles(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        kept: &[RoleId],
        reason: &str,
    ) -> Result<(), serenity::Error> {
        self.enforce(Call::SetRoles {
            user_id,
            kept: kept.to_vec(),
            reason: reason.to_string(),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    mod_log: Option<ChannelId>,
    fail_writes: bool,
    configs: Mutex<HashMap<GuildId, GuildConfig>>,
    records: Mutex<Vec<NewPunishment>>,
    assignments: Mutex<Vec<NewRoleAssignment>>,
    temp_roles: Mutex<Vec<TempRole>>,
}

impl MemoryStore {
    pub fn with_mod_log(channel_id: ChannelId) -> Self {
        Self {
            mod_log: Some(channel_id),
            ..Self::default()
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn records(&self) -> Vec<NewPunishment> {
        self.records.lock().unwrap().clone()
    }

    pub fn has_config(&self, guild_id: GuildId) -> bool {
        self.configs.lock().unwrap().contains_key(&guild_id)
    }

    pub fn config_count(&self) -> usize {
        self.configs.lock().unwrap().len()
    }

    /// Seed a tracked grant of `role_id` to TARGET
    pub fn with_temp_role(self, id: i64, role_id: RoleId, expires_at: DateTime<Utc>) -> Self {
        self.temp_roles.lock().unwrap().push(TempRole {
            id,
            guild_id: GUILD.get() as i64,
            user_id: TARGET.get() as i64,
            role_id: role_id.get() as i64,
            added_by: MODERATOR.get() as i64,
            expires_at,
            reason: None,
            created_at: Utc::now(),
        });
        self
    }

    pub fn assignments(&self) -> Vec<NewRoleAssignment> {
        self.assignments.lock().unwrap().clone()
    }

    pub fn temp_roles(&self) -> Vec<TempRole> {
        self.temp_roles.lock().unwrap().clone()
    }
}

#[serenity::async_trait]
impl ModerationStore for MemoryStore {
    async fn guild_config(&self, guild_id: GuildId) -> Result<GuildConfig, sqlx::Error> {
        let mut configs = self.configs.lock().unwrap();
        let next_id = configs.len() as i64 + 1;
        let config = configs.entry(guild_id).or_insert_with(|| GuildConfig {
            id: next_id,
            guild_id: guild_id.get() as i64,
            mod_log_channel_id: self.mod_log.map(|channel| channel.get() as i64),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(config.clone())
    }

    async fn record_punishment(&self, entry: &NewPunishment) -> Result<(), sqlx::Error> {
        if self.fail_writes {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.records.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[serenity::async_trait]
impl RoleStore for MemoryStore {
    async fn record_assignment(&self, entry: &NewRoleAssignment) -> Result<(), sqlx::Error> {
        if self.fail_writes {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.assignments.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn save_temp_role(&self, entry: &NewTempRole) -> Result<(), sqlx::Error> {
        if self.fail_writes {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut rows = self.temp_roles.lock().unwrap();
        rows.retain(|row| {
            (row.guild_id, row.user_id, row.role_id)
                != (entry.guild_id, entry.user_id, entry.role_id)
        });
        let next_id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        rows.push(TempRole {
            id: next_id,
            guild_id: entry.guild_id,
            user_id: entry.user_id,
            role_id: entry.role_id,
            added_by: entry.added_by,
            expires_at: entry.expires_at,
            reason: Some(entry.reason.clone()),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn clear_temp_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<(), sqlx::Error> {
        let key = (
            guild_id.get() as i64,
            user_id.get() as i64,
            role_id.get() as i64,
        );
        self.temp_roles
            .lock()
            .unwrap()
            .retain(|row| (row.guild_id, row.user_id, row.role_id) != key);
        Ok(())
    }

    async fn temp_roles_for(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<TempRole>, sqlx::Error> {
        let mut rows: Vec<TempRole> = self
            .temp_roles()
            .into_iter()
            .filter(|row| row.guild_id == guild_id.get() as i64 && row.user_id == user_id.get() as i64)
            .collect();
        rows.sort_by_key(|row| row.expires_at);
        Ok(rows)
    }

    async fn expired_temp_roles(&self, now: DateTime<Utc>) -> Result<Vec<TempRole>, sqlx::Error> {
        Ok(self
            .temp_roles()
            .into_iter()
            .filter(|row| row.expires_at <= now)
            .collect())
    }

    async fn delete_temp_role(&self, id: i64) -> Result<(), sqlx::Error> {
        self.temp_roles.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }
}
