mod guild_config;
mod punishment_record;
mod role_assignment;
mod temp_role;

pub use guild_config::GuildConfig;
pub use punishment_record::{ActionType, NewPunishment, PunishmentRecord, UnknownActionType};
pub use role_assignment::{NewRoleAssignment, RoleAction, RoleAssignmentRecord, UnknownRoleAction};
pub use temp_role::{NewTempRole, TempRole};
